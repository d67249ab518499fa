//! The `matchquiz score` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use matchquiz_core::scoring::{calculate_weighted_score, ScoreInput};

pub fn execute(
    correct_answers: u32,
    total_questions: u32,
    time_taken: f64,
    time_limit: f64,
    json: bool,
) -> Result<()> {
    let input = ScoreInput {
        correct_answers,
        total_questions,
        time_taken,
        time_limit,
    };
    let result = calculate_weighted_score(&input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Component", "Score"]);
    table.add_row(vec![
        Cell::new("Accuracy"),
        Cell::new(format!(
            "{:.1} ({}%)",
            result.accuracy_score, result.accuracy_percentage
        )),
    ]);
    table.add_row(vec![Cell::new("Time"), Cell::new(format!("{:.1}", result.time_score))]);
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(format!("{:.1} / 10", result.total_score)),
    ]);
    println!("{table}");

    Ok(())
}
