//! Application lifecycle

pub mod lifetime;
pub mod modes;

pub use modes::run_server;
