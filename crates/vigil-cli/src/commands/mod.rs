pub mod bench;
pub mod config;
pub mod helpers;
pub mod replay;
pub mod watch;
