//! autolot: risk-based position sizing for chart-drawn trade levels.
//!
//! Hexagonal architecture: the planning engine in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`], event dispatch in
//! [`session`] and the command-line driver in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod session;
pub mod cli;
