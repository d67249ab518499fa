//! matchquiz-core: matching engine, weighted scoring, and game flow.
//!
//! The [`session::MatchingSession`] state machine drives one matching
//! exercise on a virtual clock; [`driver`] runs it against real time on tokio.
//! [`flow::GameFlow`] wraps sessions in the full registration → results loop.

pub mod carry;
pub mod config;
pub mod driver;
pub mod error;
pub mod flow;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod targets;
pub mod view;
