//! Port traits: the seams between the planning engine and the platform.

pub mod config_port;
pub mod market_port;
pub mod line_port;
pub mod execution_port;
pub mod history_port;
pub mod ui_port;
pub mod event_port;
