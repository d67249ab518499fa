//! The `matchquiz leaderboard` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use matchquiz_core::report::{format_elapsed, GameReport};
use matchquiz_report::html::{rank, write_html_report};

/// Load every result JSON in `dir`, skipping files that do not parse.
fn load_reports(dir: &Path) -> Result<Vec<GameReport>> {
    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read results directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match GameReport::load_json(&path) {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!("skipping {}: {e:#}", path.display()),
            }
        }
    }
    Ok(reports)
}

pub fn execute(dir: PathBuf, html: Option<PathBuf>, title: String) -> Result<()> {
    let reports = load_reports(&dir)?;
    if reports.is_empty() {
        println!("No results in {}.", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Player", "Level", "Score", "Matched", "Time"]);
    for (i, report) in rank(&reports).iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&report.player.name),
            Cell::new(report.level.title()),
            Cell::new(format!("{:.1}", report.score.total_score)),
            Cell::new(format!("{}/{}", report.correct_answers, report.total_questions)),
            Cell::new(format_elapsed(report.time_taken_secs)),
        ]);
    }
    println!("{table}");

    if let Some(path) = html {
        write_html_report(&title, &reports, &path)?;
        eprintln!("HTML leaderboard: {}", path.display());
    }

    Ok(())
}
