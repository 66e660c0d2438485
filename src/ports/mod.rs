//! Port traits: the seams between the pure domain and the outside world.

pub mod config_port;
pub mod data_port;
pub mod report_port;
