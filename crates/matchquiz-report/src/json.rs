//! Appends finished games to a directory of JSON files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use matchquiz_core::report::GameReport;

use crate::error::ReportError;
use crate::sink::ResultSink;

/// Writes each report to `<dir>/<timestamp>-<id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `report` lands.
    pub fn path_for(&self, report: &GameReport) -> PathBuf {
        self.dir.join(format!(
            "{}-{}.json",
            report.created_at.format("%Y%m%dT%H%M%S"),
            report.id
        ))
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn deliver(&self, report: &GameReport) -> Result<(), ReportError> {
        let json = serde_json::to_vec_pretty(report)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(report), json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::sample_report;

    #[tokio::test]
    async fn writes_loadable_report() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("results"));
        let report = sample_report();

        sink.deliver(&report).await.unwrap();

        let path = sink.path_for(&report);
        assert!(path.exists());
        let loaded = GameReport::load_json(&path).unwrap();
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.player.email, "ravi@example.com");
    }
}
