pub mod atomic;
pub mod config_io;
