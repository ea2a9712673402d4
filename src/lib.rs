pub mod config;
pub mod logging;

pub mod checksum;
pub mod partition;
pub mod verify;
