pub mod audio;
pub mod common;
pub mod configs;
pub mod console;
pub mod playback;
pub mod protocol;
pub mod server;
pub mod sources;

#[cfg(test)]
mod test_support;
