//! Render-ready snapshots of a session, and the skin trait that draws them.
//!
//! The engine never knows how it is styled. A host takes a [`SessionView`]
//! and hands it to whichever [`Skin`] it is using.

use serde::Serialize;

use crate::session::Feedback;
use crate::targets::Point;

/// One prompt row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub slot: usize,
    pub prompt: String,
    pub matched: Option<String>,
    pub feedback: Option<Feedback>,
    /// A touch carry is currently over this slot.
    pub hovered: bool,
}

/// The floating copy of an answer that follows a touch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragPreview {
    pub answer: String,
    pub position: Point,
}

/// Everything a skin needs to draw the matching screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub slots: Vec<SlotView>,
    pub remaining_answers: Vec<String>,
    /// Answer currently being carried by either input stream.
    pub carrying: Option<String>,
    pub preview: Option<DragPreview>,
    pub remaining_secs: u32,
    /// `mm:ss` rendering of `remaining_secs`.
    pub clock: String,
    pub completed: bool,
    /// The submit button is enabled.
    pub can_submit: bool,
}

/// A presentation layer over [`SessionView`].
pub trait Skin {
    fn name(&self) -> &str;

    fn render(&self, view: &SessionView) -> String;
}

/// Plain text rendering, one line per prompt.
pub struct PlainSkin;

impl Skin for PlainSkin {
    fn name(&self) -> &str {
        "plain"
    }

    fn render(&self, view: &SessionView) -> String {
        let mut out = format!("Time left {}\n", view.clock);
        for slot in &view.slots {
            let marker = match slot.feedback {
                Some(Feedback::Correct) => "[ok]",
                Some(Feedback::Wrong) => "[x]",
                None if slot.hovered => "[>]",
                None => "[ ]",
            };
            out.push_str(&format!("{marker} {}", slot.prompt));
            if let Some(answer) = &slot.matched {
                out.push_str(&format!(" => {answer}"));
            }
            out.push('\n');
        }
        if !view.remaining_answers.is_empty() {
            out.push_str("Answers:\n");
            for (i, answer) in view.remaining_answers.iter().enumerate() {
                out.push_str(&format!("  {}. {answer}\n", i + 1));
            }
        }
        out
    }
}

/// `mm:ss` with zero padding, as shown on the matching timer.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(120), "02:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn plain_skin_marks_feedback() {
        let view = SessionView {
            slots: vec![
                SlotView {
                    slot: 0,
                    prompt: "Quick Campaign".into(),
                    matched: Some("1-Click".into()),
                    feedback: Some(Feedback::Correct),
                    hovered: false,
                },
                SlotView {
                    slot: 1,
                    prompt: "Keyword Targeting".into(),
                    matched: None,
                    feedback: Some(Feedback::Wrong),
                    hovered: true,
                },
            ],
            remaining_answers: vec!["Exact customers".into()],
            carrying: None,
            preview: None,
            remaining_secs: 75,
            clock: format_clock(75),
            completed: false,
            can_submit: false,
        };
        let text = PlainSkin.render(&view);
        assert!(text.starts_with("Time left 01:15"));
        assert!(text.contains("[ok] Quick Campaign => 1-Click"));
        assert!(text.contains("[x] Keyword Targeting"));
        assert!(text.contains("1. Exact customers"));
    }
}
