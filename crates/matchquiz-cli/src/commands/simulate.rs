//! The `matchquiz simulate` command.
//!
//! Replays a scripted sequence of pointer and touch events against a seeded
//! matching session, then prints the board and the outcome.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use matchquiz_core::carry::InputEvent;
use matchquiz_core::config::{load_config_from, QuizConfig};
use matchquiz_core::flow::register_player;
use matchquiz_core::model::{ContentBank, Level};
use matchquiz_core::parser::parse_content_bank;
use matchquiz_core::report::GameReport;
use matchquiz_core::session::{Feedback, MatchingSession, Reaction, SessionOutcome};
use matchquiz_core::targets::{DropZoneLayout, Point};
use matchquiz_core::view::{PlainSkin, SessionView, Skin};
use matchquiz_report::{deliver_best_effort, FanOutSink, JsonFileSink, WebhookSink};

pub struct SimulateArgs {
    pub script: PathBuf,
    pub content: Option<PathBuf>,
    pub seed: Option<u64>,
    pub email: Option<String>,
    pub results_dir: Option<PathBuf>,
    pub plain: bool,
    pub json: bool,
    pub config: Option<PathBuf>,
}

/// A replay script.
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    level: Option<Level>,
    #[serde(default)]
    seed: Option<u64>,
    /// Drop regions; one 400x60 row per prompt when empty.
    #[serde(default)]
    layout: DropZoneLayout,
    /// Stop the clock here instead of running to the time limit.
    #[serde(default)]
    until_ms: Option<u64>,
    #[serde(default)]
    events: Vec<ScriptEvent>,
}

#[derive(Debug, Deserialize)]
struct ScriptEvent {
    at_ms: u64,
    #[serde(flatten)]
    action: ScriptAction,
}

fn one() -> usize {
    1
}

/// Answers are picked by presentation index (`item`) or by text (`answer`).
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScriptAction {
    /// Pointer drag of an answer straight onto a slot.
    Place {
        item: Option<usize>,
        answer: Option<String>,
        slot: usize,
    },
    DragStart {
        item: Option<usize>,
        answer: Option<String>,
    },
    Drop {
        slot: usize,
    },
    DragCancel,
    TouchStart {
        item: Option<usize>,
        answer: Option<String>,
        x: f64,
        y: f64,
        #[serde(default = "one")]
        fingers: usize,
    },
    TouchMove {
        x: f64,
        y: f64,
        #[serde(default = "one")]
        fingers: usize,
    },
    TouchEnd {
        x: f64,
        y: f64,
    },
    TouchCancel,
    /// Press the submit button.
    Submit,
}

impl ScriptAction {
    fn inputs(&self, session: &MatchingSession) -> Result<Vec<InputEvent>> {
        let events = match self {
            ScriptAction::Place { item, answer, slot } => {
                let item = pick(session, *item, answer.as_deref())?;
                vec![InputEvent::DragStart { item }, InputEvent::Drop { slot: *slot }]
            }
            ScriptAction::DragStart { item, answer } => {
                let item = pick(session, *item, answer.as_deref())?;
                vec![InputEvent::DragStart { item }]
            }
            ScriptAction::Drop { slot } => vec![InputEvent::Drop { slot: *slot }],
            ScriptAction::DragCancel => vec![InputEvent::DragCancel],
            ScriptAction::TouchStart {
                item,
                answer,
                x,
                y,
                fingers,
            } => {
                let item = pick(session, *item, answer.as_deref())?;
                vec![InputEvent::TouchStart {
                    item,
                    touches: vec![Point::new(*x, *y); *fingers],
                }]
            }
            ScriptAction::TouchMove { x, y, fingers } => vec![InputEvent::TouchMove {
                touches: vec![Point::new(*x, *y); *fingers],
            }],
            ScriptAction::TouchEnd { x, y } => vec![InputEvent::touch_end(*x, *y)],
            ScriptAction::TouchCancel => vec![InputEvent::TouchCancel],
            ScriptAction::Submit => Vec::new(),
        };
        Ok(events)
    }
}

/// Resolve an answer reference against the current presentation order.
fn pick(session: &MatchingSession, item: Option<usize>, answer: Option<&str>) -> Result<usize> {
    match (item, answer) {
        (Some(item), _) => Ok(item),
        // An answer that is no longer on offer resolves past the end and is ignored.
        (None, Some(answer)) => Ok(session
            .position_of(answer)
            .unwrap_or(session.presentation().len())),
        (None, None) => anyhow::bail!("event needs an `item` or an `answer`"),
    }
}

/// One line of the replay log.
#[derive(Debug, Serialize)]
struct LogEntry {
    at_ms: u64,
    reaction: String,
}

#[derive(Debug, Serialize)]
struct Replay {
    level: Level,
    seed: u64,
    log: Vec<LogEntry>,
    board: SessionView,
    outcome: Option<SessionOutcome>,
}

fn describe(reaction: &Reaction) -> String {
    match reaction {
        Reaction::Ignored => "ignored".into(),
        Reaction::CarryStarted { answer, origin } => format!("carrying {answer:?} ({origin:?})"),
        Reaction::Hovering(Some(slot)) => format!("over slot {slot}"),
        Reaction::Hovering(None) => "over nothing".into(),
        Reaction::Matched { slot, completed } => {
            if *completed {
                format!("matched slot {slot}, board complete")
            } else {
                format!("matched slot {slot}")
            }
        }
        Reaction::Rejected { slot } => format!("rejected on slot {slot}"),
        Reaction::Released => "released".into(),
    }
}

fn load_script(path: &Path) -> Result<Script> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse script: {}", path.display()))
}

fn load_bank(path: Option<&Path>) -> Result<ContentBank> {
    match path {
        Some(path) => parse_content_bank(path),
        None => Ok(ContentBank::builtin()),
    }
}

fn replay(config: &QuizConfig, bank: &ContentBank, script: Script, seed: u64) -> Result<Replay> {
    let level = script.level.unwrap_or(Level::NewToAds);
    let content = bank
        .level(level)
        .with_context(|| format!("content bank {} has no level {level}", bank.id))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let session_config = config.session();
    let end = script.until_ms.map(Duration::from_millis).unwrap_or_else(|| {
        Duration::from_secs(u64::from(session_config.time_limit_secs))
            + session_config.completion_grace
    });
    let mut session = MatchingSession::new(
        content.left.clone(),
        content.right.clone(),
        session_config,
        &mut rng,
    )?;

    let layout = if script.layout.is_empty() {
        DropZoneLayout::column(content.left.len(), Point::new(0.0, 0.0), 400.0, 60.0)
    } else {
        script.layout
    };

    let mut events = script.events;
    events.sort_by_key(|e| e.at_ms);

    let mut log = Vec::new();
    let mut outcome = None;
    for event in events {
        let now = Duration::from_millis(event.at_ms);
        if now > end {
            break;
        }
        if let Some(o) = session.advance_to(now) {
            outcome = Some(o);
        }
        if let ScriptAction::Submit = event.action {
            let submitted = session.submit(now);
            log.push(LogEntry {
                at_ms: event.at_ms,
                reaction: if submitted.is_some() {
                    "submitted".into()
                } else {
                    "submit ignored".into()
                },
            });
            outcome = outcome.or(submitted);
            continue;
        }
        for input in event.action.inputs(&session)? {
            let reaction = session.handle(now, input, &layout);
            log.push(LogEntry {
                at_ms: event.at_ms,
                reaction: describe(&reaction),
            });
        }
    }
    if let Some(o) = session.advance_to(end) {
        outcome = Some(o);
    }

    Ok(Replay {
        level,
        seed,
        log,
        board: session.view(),
        outcome,
    })
}

fn board_table(view: &SessionView) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Slot", "Prompt", "Matched", ""]);
    for slot in &view.slots {
        let mark = match slot.feedback {
            Some(Feedback::Correct) => "ok",
            Some(Feedback::Wrong) => "x",
            None => "",
        };
        table.add_row(vec![
            Cell::new(slot.slot),
            Cell::new(&slot.prompt),
            Cell::new(slot.matched.as_deref().unwrap_or("-")),
            Cell::new(mark),
        ]);
    }
    table
}

pub async fn execute(args: SimulateArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let script = load_script(&args.script)?;
    let content_path = args.content.clone().or_else(|| config.content_path.clone());
    let bank = load_bank(content_path.as_deref())?;
    let seed = args.seed.or(script.seed).unwrap_or(0);

    let replay = replay(&config, &bank, script, seed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&replay)?);
    } else {
        for entry in &replay.log {
            println!(
                "{:>4}.{:03}s  {}",
                entry.at_ms / 1000,
                entry.at_ms % 1000,
                entry.reaction
            );
        }
        println!();
        if args.plain {
            print!("{}", PlainSkin.render(&replay.board));
        } else {
            println!("{}", board_table(&replay.board));
            if !replay.board.remaining_answers.is_empty() {
                println!("Answers left: {}", replay.board.remaining_answers.join(", "));
            }
            println!("Time left: {}", replay.board.clock);
        }
        match &replay.outcome {
            Some(outcome) => println!(
                "Submitted ({:?}): {}/{} matched in {}s, score {:.1}/10",
                outcome.reason,
                outcome.correct_answers,
                outcome.total_questions,
                outcome.time_taken,
                outcome.total_score
            ),
            None => println!("No outcome yet."),
        }
    }

    if let (Some(email), Some(outcome)) = (args.email.as_deref(), replay.outcome.as_ref()) {
        let player = register_player(email)?;
        let report = GameReport::new(player, replay.level, outcome);

        let mut sink = FanOutSink::new();
        if let Some(dir) = args.results_dir {
            sink.push(Box::new(JsonFileSink::new(dir)));
        }
        if let Some(webhook) = config.webhook.clone().filter(|w| !w.url.is_empty()) {
            sink.push(Box::new(WebhookSink::new(webhook)?));
        }
        if sink.is_empty() {
            tracing::info!("no result sinks configured");
        } else {
            deliver_best_effort(&sink, &report).await;
        }
        eprintln!("{}", report.summary());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
level = "new-to-ads"

[[events]]
at_ms = 900
kind = "submit"

[[events]]
at_ms = 500
kind = "place"
answer = "Tokyo"
slot = 0
"#;

    fn capitals() -> ContentBank {
        matchquiz_core::parser::parse_content_bank_str(
            r#"
[bank]
id = "capitals"
name = "Capitals"

[levels.new-to-ads]
left = ["France", "Japan"]
right = ["Paris", "Tokyo"]
"#,
            Path::new("capitals.toml"),
        )
        .unwrap()
    }

    #[test]
    fn script_events_are_sorted_and_described() {
        let script: Script = toml::from_str(SCRIPT).unwrap();
        let replay = replay(&QuizConfig::default(), &capitals(), script, 3).unwrap();

        assert_eq!(replay.log[0].at_ms, 500);
        assert_eq!(replay.log[0].reaction, "carrying \"Tokyo\" (Pointer)");
        assert_eq!(replay.log[1].reaction, "rejected on slot 0");
        assert_eq!(replay.log[2].reaction, "submit ignored");

        let outcome = replay.outcome.unwrap();
        assert_eq!(outcome.correct_answers, 0);
        assert_eq!(outcome.time_taken, 120);
    }

    #[test]
    fn touch_events_use_default_column() {
        let script: Script = toml::from_str(
            r#"
[[events]]
at_ms = 0
kind = "touch_start"
answer = "Tokyo"
x = 10.0
y = 500.0

[[events]]
at_ms = 200
kind = "touch_end"
x = 200.0
y = 90.0

[[events]]
at_ms = 300
kind = "place"
answer = "Paris"
slot = 0
"#,
        )
        .unwrap();
        let replay = replay(&QuizConfig::default(), &capitals(), script, 3).unwrap();

        assert_eq!(replay.log[1].reaction, "matched slot 1");
        assert_eq!(replay.log[3].reaction, "matched slot 0, board complete");
        let outcome = replay.outcome.unwrap();
        assert_eq!(outcome.correct_answers, 2);
        assert_eq!(outcome.total_score, 10.0);
        assert!(replay.board.completed);
    }

    #[test]
    fn until_stops_the_clock() {
        let script: Script = toml::from_str("until_ms = 30000\n").unwrap();
        let replay = replay(&QuizConfig::default(), &capitals(), script, 3).unwrap();
        assert!(replay.outcome.is_none());
        assert_eq!(replay.board.remaining_secs, 90);
    }

    #[test]
    fn missing_answer_reference_is_an_error() {
        let script: Script = toml::from_str(
            r#"
[[events]]
at_ms = 0
kind = "drag_start"
"#,
        )
        .unwrap();
        assert!(replay(&QuizConfig::default(), &capitals(), script, 3).is_err());
    }
}
