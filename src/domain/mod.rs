//! Core planning engine. Pure: no I/O, driven by snapshots and events.

pub mod symbol;
pub mod side;
pub mod risk_sizer;
pub mod line_plan;
pub mod mode_controller;
pub mod order_planner;
pub mod trade_stats;
pub mod command;
pub mod event;
pub mod config_validation;
pub mod error;
