//! The `matchquiz init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("matchquiz.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("content").context("failed to create content/")?;
    write_if_missing(Path::new("content/quiz.toml"), EXAMPLE_CONTENT)?;
    write_if_missing(Path::new("content/script.toml"), EXAMPLE_SCRIPT)?;

    println!("\nNext steps:");
    println!("  1. Edit matchquiz.toml with your webhook URL");
    println!("  2. Run: matchquiz validate --content content/quiz.toml");
    println!("  3. Run: matchquiz simulate --script content/script.toml --content content/quiz.toml");

    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# matchquiz configuration

matching_time_limit_secs = 120
memorizing_time_secs = 90
wrong_feedback_ms = 1000
completion_grace_ms = 1000
results_restart_secs = 5
content_path = "content/quiz.toml"

[webhook]
url = "${MATCHQUIZ_WEBHOOK_URL}"
game_name = "Capitals"
element_id = "01"
location = ""
"#;

const EXAMPLE_CONTENT: &str = r#"[bank]
id = "capitals"
name = "Capitals"

[levels.new-to-ads]
memorizing = [
    "Paris is the capital of France.",
    "Tokyo is the capital of Japan.",
    "Canberra is the capital of Australia.",
]
left = ["France", "Japan", "Australia"]
right = ["Paris", "Tokyo", "Canberra"]
"#;

const EXAMPLE_SCRIPT: &str = r#"# Replayed by `matchquiz simulate`. Times are milliseconds since the
# matching screen opened.
level = "new-to-ads"
seed = 7

[[events]]
at_ms = 1500
kind = "place"
answer = "Tokyo"
slot = 0

[[events]]
at_ms = 4000
kind = "place"
answer = "Paris"
slot = 0

[[events]]
at_ms = 6000
kind = "touch_start"
answer = "Tokyo"
x = 20.0
y = 400.0

[[events]]
at_ms = 6300
kind = "touch_move"
x = 120.0
y = 90.0

[[events]]
at_ms = 6500
kind = "touch_end"
x = 120.0
y = 90.0

[[events]]
at_ms = 9000
kind = "place"
answer = "Canberra"
slot = 2
"#;
