//! Port traits decoupling the domain from I/O.

pub mod config_port;
pub mod data_port;
pub mod results_port;
