//! Line-oriented driver: reads `<room> <command> [query]` from stdin and
//! prints what each intent did.

use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::oneshot,
    task::JoinSet,
};
use tracing::{debug, warn};

use crate::{
    common::{Severity, types::RoomId},
    log_println,
    protocol::{
        Intent, IntentOutcome, PauseOutcome, PlayAck, ResumeOutcome, SkipOutcome, StatusEvent,
        StopOutcome,
    },
    server::Dispatcher,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("expected `<room> <command> [query]`")]
    Incomplete,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{0}` takes no arguments")]
    UnexpectedArgs(String),
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Option<Result<(RoomId, Intent), CommandError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (room, rest) = match line.split_once(char::is_whitespace) {
        Some((room, rest)) => (room, rest.trim_start()),
        None => return Some(Err(CommandError::Incomplete)),
    };
    let (command, args) = match rest.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (rest, ""),
    };

    let command = command.to_ascii_lowercase();
    let intent = match command.as_str() {
        "play" => Intent::Play {
            query: args.to_string(),
        },
        "pause" => Intent::Pause,
        "resume" => Intent::Resume,
        "skip" => Intent::Skip,
        "stop" => Intent::Stop,
        "status" => Intent::Status,
        other => return Some(Err(CommandError::UnknownCommand(other.to_string()))),
    };

    if !args.is_empty() && !matches!(intent, Intent::Play { .. }) {
        return Some(Err(CommandError::UnexpectedArgs(command)));
    }

    Some(Ok((RoomId::from(room), intent)))
}

/// Renders an outcome as the single line shown to the user.
pub fn describe(room: &RoomId, outcome: &IntentOutcome) -> String {
    let text = match outcome {
        IntentOutcome::Play(Ok(PlayAck::NowPlaying { track })) => {
            format!("now playing: {}", track)
        }
        IntentOutcome::Play(Ok(PlayAck::Queued { track, position })) => {
            format!("queued at #{}: {}", position, track)
        }
        IntentOutcome::Play(Err(e)) => match e.severity() {
            Severity::Common => format!("could not play: {}", e),
            Severity::Fault => format!("playback failed: {}", e),
        },
        IntentOutcome::Pause(PauseOutcome::Paused) => "paused".to_string(),
        IntentOutcome::Pause(PauseOutcome::NothingPlaying) => "nothing is playing".to_string(),
        IntentOutcome::Resume(ResumeOutcome::Resumed) => "resumed".to_string(),
        IntentOutcome::Resume(ResumeOutcome::NothingPaused) => "nothing is paused".to_string(),
        IntentOutcome::Skip(SkipOutcome::Skipped { track }) => format!("skipped: {}", track),
        IntentOutcome::Skip(SkipOutcome::NothingPlaying) => "nothing is playing".to_string(),
        IntentOutcome::Stop(StopOutcome::Stopped { discarded }) => {
            format!("stopped, {} tracks discarded", discarded)
        }
        IntentOutcome::Pause(PauseOutcome::NoSession)
        | IntentOutcome::Resume(ResumeOutcome::NoSession)
        | IntentOutcome::Skip(SkipOutcome::NoSession)
        | IntentOutcome::Stop(StopOutcome::NoSession)
        | IntentOutcome::Status(None) => "not in this room".to_string(),
        IntentOutcome::Status(Some(snapshot)) => {
            let current = snapshot
                .current
                .as_ref()
                .map(|t| t.title.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "{:?} | current: {} | queued: {}",
                snapshot.state,
                current,
                snapshot.queue.len()
            )
        }
    };
    format!("[{}] {}", room, text)
}

/// Printers still waiting on their intent's outcome.
struct InFlight {
    tasks: JoinSet<()>,
}

impl InFlight {
    fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    /// Reaps finished printers, then starts one for `receipt`.
    fn watch(&mut self, room: RoomId, receipt: oneshot::Receiver<IntentOutcome>) {
        while self.tasks.try_join_next().is_some() {}

        self.tasks.spawn(async move {
            match receipt.await {
                Ok(outcome) => log_println!("{}", describe(&room, &outcome)),
                Err(_) => warn!("[{}] intent was dropped before completing", room),
            }
        });
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    async fn finish(mut self) {
        while self.tasks.join_next().await.is_some() {}
    }
}

/// Feeds every line of `input` to the dispatcher until EOF. Outcomes are
/// printed as they arrive, so a slow search does not block the next line.
pub async fn run<R>(dispatcher: Dispatcher, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut in_flight = InFlight::new();

    while let Some(line) = lines.next_line().await? {
        let (room, intent) = match parse_line(&line) {
            Some(Ok(parsed)) => parsed,
            Some(Err(e)) => {
                log_println!("{}", e);
                continue;
            }
            None => continue,
        };

        debug!("[{}] console intent: {}", room, intent.name());
        let receipt = dispatcher.dispatch(room.clone(), intent);
        in_flight.watch(room, receipt);
    }

    in_flight.finish().await;
    Ok(())
}

/// Prints room events until every sender is gone.
pub async fn report_events(events: flume::Receiver<StatusEvent>) {
    while let Ok(event) = events.recv_async().await {
        match serde_json::to_string(&event) {
            Ok(json) => debug!("event: {}", json),
            Err(e) => warn!("could not serialize event: {}", e),
        }
        let room_id = event.room_id();
        match &event {
            StatusEvent::NowPlaying { track, .. } => log_println!("[{}] > {}", room_id, track),
            StatusEvent::TrackFailed {
                track,
                message,
                severity,
                ..
            } => log_println!(
                "[{}] ! {} failed ({:?}): {}",
                room_id,
                track,
                severity,
                message
            ),
            StatusEvent::SessionClosed { reason, .. } => {
                log_println!("[{}] left the room ({:?})", room_id, reason)
            }
            _ => {}
        }
    }
}
