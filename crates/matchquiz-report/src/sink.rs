//! The result sink trait and the simple sinks.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use matchquiz_core::report::GameReport;

use crate::error::ReportError;

/// Somewhere a finished game is sent.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn deliver(&self, report: &GameReport) -> Result<(), ReportError>;
}

/// Drops every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl ResultSink for NoopSink {
    fn name(&self) -> &str {
        "noop"
    }

    async fn deliver(&self, _report: &GameReport) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Sends each report to every inner sink concurrently.
#[derive(Default)]
pub struct FanOutSink {
    sinks: Vec<Box<dyn ResultSink>>,
}

impl FanOutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn ResultSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl ResultSink for FanOutSink {
    fn name(&self) -> &str {
        "fan-out"
    }

    async fn deliver(&self, report: &GameReport) -> Result<(), ReportError> {
        let results = join_all(self.sinks.iter().map(|sink| sink.deliver(report))).await;
        let failures: Vec<String> = self
            .sinks
            .iter()
            .zip(results)
            .filter_map(|(sink, result)| result.err().map(|e| format!("{}: {e}", sink.name())))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ReportError::Multiple(failures))
        }
    }
}

/// Deliver a report, logging instead of failing.
///
/// The results screen never waits on delivery; returns whether it succeeded.
pub async fn deliver_best_effort(sink: &dyn ResultSink, report: &GameReport) -> bool {
    match sink.deliver(report).await {
        Ok(()) => {
            info!(sink = sink.name(), report = %report.id, "result delivered");
            true
        }
        Err(e) => {
            warn!(sink = sink.name(), report = %report.id, "failed to deliver result: {e}");
            false
        }
    }
}
