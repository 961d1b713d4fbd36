//! Command implementations for the CLI.

mod config;
mod room;
mod status;
mod watch;

pub use config::cmd_config;
pub use room::cmd_room;
pub use status::cmd_status;
pub use watch::{WatchArgs, cmd_watch};
