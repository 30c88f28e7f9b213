//! Concrete adapter implementations for ports.

pub mod console_ui;
pub mod csv_history_adapter;
pub mod file_config_adapter;
pub mod memory_line_surface;
pub mod paper_gateway;
pub mod scripted_events;
pub mod static_market;
