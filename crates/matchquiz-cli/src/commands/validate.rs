//! The `matchquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use matchquiz_core::parser::{load_content, validate_content_bank};

pub fn execute(content_path: PathBuf) -> Result<()> {
    let banks = load_content(&content_path)?;
    if banks.is_empty() {
        anyhow::bail!("no content banks found in {}", content_path.display());
    }

    let mut total_warnings = 0;

    for bank in &banks {
        let questions: usize = bank.levels.values().map(|l| l.question_count()).sum();
        println!(
            "Content bank: {} ({} levels, {} questions)",
            bank.name,
            bank.levels.len(),
            questions
        );

        let warnings = validate_content_bank(bank);
        for w in &warnings {
            let prefix = w
                .level
                .map(|level| format!("  [{level}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All content banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
