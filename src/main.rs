use std::sync::Arc;

use queuelink::{
    audio::SimulatedConnector,
    common::{logger, types::AnyResult},
    configs::Config,
    console,
    server::Dispatcher,
    sources::SourceManager,
};
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    logger::init(&config);

    let sources = SourceManager::new(&config.resolver);
    info!("Sources: {}", sources.source_names().join(", "));
    let connector = SimulatedConnector::new(&config.sink);

    let (dispatcher, events) =
        Dispatcher::new(Arc::new(sources), Arc::new(connector), config.player.clone());
    tokio::spawn(console::report_events(events));

    info!("Reading `<room> <play|pause|resume|skip|stop|status> [query]` from stdin");
    let input = BufReader::new(tokio::io::stdin());

    tokio::select! {
        result = console::run(dispatcher.clone(), input) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    let rooms = dispatcher.registry().rooms();
    futures::future::join_all(rooms.iter().map(|room| dispatcher.stop(room))).await;
    info!("Shut down");

    Ok(())
}
