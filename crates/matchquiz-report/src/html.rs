//! HTML leaderboard generator.
//!
//! Produces a self-contained HTML page with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use matchquiz_core::report::{format_elapsed, GameReport};
use matchquiz_core::scoring::COMPONENT_MAX;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Reports ordered best first: higher score, then faster.
pub fn rank(reports: &[GameReport]) -> Vec<&GameReport> {
    let mut ranked: Vec<&GameReport> = reports.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_score
            .total_cmp(&a.score.total_score)
            .then(a.time_taken_secs.cmp(&b.time_taken_secs))
    });
    ranked
}

/// Generate a leaderboard page from finished games.
pub fn generate_html(title: &str, reports: &[GameReport]) -> String {
    let ranked = rank(reports);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{} leaderboard</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{} leaderboard</h1>\n", html_escape(title)));
    let newest = reports.iter().map(|r| r.created_at).max();
    html.push_str(&format!(
        "<p class=\"meta\">{} games{}</p>\n",
        reports.len(),
        newest
            .map(|t| format!(" | last played {}", t.format("%Y-%m-%d %H:%M:%S UTC")))
            .unwrap_or_default()
    ));
    html.push_str("</header>\n");

    // Score chart
    if !ranked.is_empty() {
        html.push_str("<section class=\"dashboard\">\n");
        html.push_str("<h2>Scores</h2>\n");
        html.push_str(&generate_bar_chart(&ranked));
        html.push_str("</section>\n");
    }

    // Per-game results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Games</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Player</th><th onclick=\"sortTable(2)\">Level</th><th onclick=\"sortTable(3)\">Score</th><th onclick=\"sortTable(4)\">Matched</th><th onclick=\"sortTable(5)\">Time</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, report) in ranked.iter().enumerate() {
        let class = if report.is_success() { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{}\"><td class=\"num\">{}</td><td>{}</td><td>{}</td><td class=\"num\">{:.1}</td><td class=\"num\">{}/{} ({}%)</td><td class=\"num\">{}</td></tr>\n",
            class,
            i + 1,
            html_escape(&report.player.name),
            report.level.title(),
            report.score.total_score,
            report.correct_answers,
            report.total_questions,
            report.score.accuracy_percentage,
            format_elapsed(report.time_taken_secs),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(reports)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write a leaderboard page to a file.
pub fn write_html_report(title: &str, reports: &[GameReport], path: &Path) -> Result<()> {
    let html = generate_html(title, reports);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write leaderboard to {}", path.display()))?;
    Ok(())
}

/// Stacked bars: accuracy component, then time component, out of 10.
fn generate_bar_chart(ranked: &[&GameReport]) -> String {
    let bar_height = 30;
    let max_width = 400.0;
    let padding = 10;
    let label_width = 200;
    let scale = max_width / (2.0 * COMPONENT_MAX);

    let total_height = ranked.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width as usize + 60,
        total_height
    );

    for (i, report) in ranked.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let accuracy_width = (report.score.accuracy_score * scale) as usize;
        let time_width = (report.score.time_score * scale) as usize;

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&report.player.name)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#22c55e\" rx=\"4\"/>\n",
            label_width, y, accuracy_width, bar_height
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#3b82f6\" rx=\"4\"/>\n",
            label_width + accuracy_width, y, time_width, bar_height
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}</text>\n",
            label_width + accuracy_width + time_width + 8,
            y + bar_height / 2,
            report.score.total_score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
tr.fail td { opacity: 0.8; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = isNaN(na) || isNaN(nb) ? va.localeCompare(vb) : na - nb;
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::sample_report;

    fn reports() -> Vec<GameReport> {
        let mut slow = sample_report();
        slow.player.name = "<slow>".into();
        slow.time_taken_secs = 110;
        let mut best = sample_report();
        best.player.name = "best".into();
        best.score.total_score = 9.6;
        let fast = sample_report();
        vec![slow, best, fast]
    }

    #[test]
    fn rank_by_score_then_time() {
        let reports = reports();
        let ranked = rank(&reports);
        let names: Vec<&str> = ranked.iter().map(|r| r.player.name.as_str()).collect();
        assert_eq!(names, ["best", "ravi", "<slow>"]);
    }

    #[test]
    fn html_report_contains_required_elements() {
        let html = generate_html("Ads Memory", &reports());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Ads Memory leaderboard"));
        assert!(html.contains("3 games"));
        assert!(html.contains("&lt;slow&gt;"));
        assert!(!html.contains("<slow>"));
        assert!(html.contains("7/8 (88%)"));
        assert!(html.contains("1:50"));
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("leaderboard.html");

        write_html_report("Ads Memory", &reports(), &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn empty_leaderboard_has_no_chart() {
        let html = generate_html("Ads Memory", &[]);
        assert!(html.contains("0 games"));
        assert!(!html.contains("<svg"));
    }
}
