pub mod api;
pub mod config_io;
pub mod logging;
pub mod worker;
