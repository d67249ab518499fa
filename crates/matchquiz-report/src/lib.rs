//! matchquiz-report: delivering finished games.
//!
//! A [`ResultSink`] takes a [`GameReport`](matchquiz_core::report::GameReport)
//! somewhere: a webhook, a JSON file, or nowhere. [`html`] renders the
//! results card.

pub mod error;
pub mod html;
pub mod json;
pub mod sink;
pub mod webhook;

pub use error::ReportError;
pub use json::JsonFileSink;
pub use sink::{deliver_best_effort, FanOutSink, NoopSink, ResultSink};
pub use webhook::WebhookSink;
