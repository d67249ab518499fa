//! The matching session state machine.
//!
//! A [`MatchingSession`] owns one attempt at a matching exercise: the
//! shuffled answers still on offer, the correct matches made so far,
//! transient per-slot feedback, the active carry, and the countdown. Time is
//! virtual; every call carries the elapsed time since the session started,
//! and timed work (countdown ticks, feedback expiry, the completion grace
//! period) is drained from an ordered timer queue.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::carry::{single_touch, CarriedItem, Carry, CarryOrigin, InputEvent};
use crate::error::SessionError;
use crate::scoring::{calculate_weighted_score, ScoreInput, ScoreResult};
use crate::targets::{DropTargets, Point};
use crate::view::{format_clock, DragPreview, SessionView, SlotView};

const TICK: Duration = Duration::from_secs(1);

/// Timing knobs for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Countdown start, in whole seconds.
    pub time_limit_secs: u32,
    /// How long a wrong-drop marker stays on its slot.
    pub wrong_feedback: Duration,
    /// Delay between the last correct match and submission.
    pub completion_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 120,
            wrong_feedback: Duration::from_secs(1),
            completion_grace: Duration::from_secs(1),
        }
    }
}

/// Per-slot feedback tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy)]
struct FeedbackEntry {
    kind: Feedback,
    /// Distinguishes successive wrong markers on the same slot.
    token: u64,
}

/// Why a session was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    /// Every prompt matched; submitted after the grace period.
    Completed,
    /// The countdown reached zero.
    TimedOut,
    /// The player pressed submit on a completed board.
    Manual,
}

/// What a session hands back to its caller, exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub total_score: f64,
    /// Whole seconds used.
    pub time_taken: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub score: ScoreResult,
    pub reason: SubmitReason,
}

/// How the session reacted to one input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// The event did not apply to the current state.
    Ignored,
    CarryStarted { answer: String, origin: CarryOrigin },
    /// The touch moved; the slot under it (if any).
    Hovering(Option<usize>),
    /// A correct pairing was recorded.
    Matched { slot: usize, completed: bool },
    /// The drop was refused; the answer stays available.
    Rejected { slot: usize },
    /// The carry ended without reaching a slot.
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKind {
    CountdownTick,
    ClearWrong { slot: usize, token: u64 },
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Timer {
    due: Duration,
    seq: u64,
    kind: TimerKind,
}

/// One attempt at a matching exercise.
#[derive(Debug)]
pub struct MatchingSession {
    prompts: Vec<String>,
    answers: Vec<String>,
    presentation: Vec<String>,
    matches: BTreeMap<usize, String>,
    feedback: BTreeMap<usize, FeedbackEntry>,
    carry: Carry,
    config: SessionConfig,
    remaining_secs: u32,
    clock: Duration,
    timers: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
    completed: bool,
    submitted: bool,
    torn_down: bool,
    outcome: Option<SessionOutcome>,
    delivered: bool,
}

impl MatchingSession {
    /// Start a session, shuffling `answers` into a presentation order.
    ///
    /// `answers[i]` is the correct match for `prompts[i]`.
    pub fn new<R: Rng + ?Sized>(
        prompts: Vec<String>,
        answers: Vec<String>,
        config: SessionConfig,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        if prompts.is_empty() {
            return Err(SessionError::NoPrompts);
        }
        if prompts.len() != answers.len() {
            return Err(SessionError::LengthMismatch {
                prompts: prompts.len(),
                answers: answers.len(),
            });
        }
        if config.time_limit_secs == 0 {
            return Err(SessionError::ZeroTimeLimit);
        }

        let mut presentation = answers.clone();
        presentation.shuffle(rng);

        let mut session = Self {
            prompts,
            answers,
            presentation,
            matches: BTreeMap::new(),
            feedback: BTreeMap::new(),
            carry: Carry::Idle,
            remaining_secs: config.time_limit_secs,
            config,
            clock: Duration::ZERO,
            timers: BinaryHeap::new(),
            next_seq: 0,
            completed: false,
            submitted: false,
            torn_down: false,
            outcome: None,
            delivered: false,
        };
        session.schedule(TICK, TimerKind::CountdownTick);
        debug!(prompts = session.prompts.len(), "matching session started");
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Answers still available, in the order the player sees them.
    pub fn presentation(&self) -> &[String] {
        &self.presentation
    }

    /// Position of `answer` in the presentation order.
    pub fn position_of(&self, answer: &str) -> Option<usize> {
        self.presentation.iter().position(|a| a == answer)
    }

    pub fn matches(&self) -> &BTreeMap<usize, String> {
        &self.matches
    }

    pub fn feedback(&self, slot: usize) -> Option<Feedback> {
        self.feedback.get(&slot).map(|entry| entry.kind)
    }

    pub fn carry(&self) -> &Carry {
        &self.carry
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn time_taken(&self) -> u32 {
        self.config.time_limit_secs - self.remaining_secs
    }

    pub fn elapsed(&self) -> Duration {
        self.clock
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// The submitted outcome, whether or not it has been taken.
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// When the next timer is due, if any work is still scheduled.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.torn_down || self.submitted {
            return None;
        }
        self.timers.peek().map(|Reverse(timer)| timer.due)
    }

    // -----------------------------------------------------------------------
    // Driving the session
    // -----------------------------------------------------------------------

    /// Run every timer due at or before `now`.
    ///
    /// Returns the outcome the first time the session is submitted.
    pub fn advance_to(&mut self, now: Duration) -> Option<SessionOutcome> {
        self.run_timers(now);
        self.take_outcome()
    }

    /// Apply one input event at `now`, after any timers due by then.
    pub fn handle(&mut self, now: Duration, event: InputEvent, targets: &dyn DropTargets) -> Reaction {
        self.run_timers(now);
        if self.torn_down || self.submitted {
            return Reaction::Ignored;
        }

        match event {
            InputEvent::DragStart { item } => self.begin_carry(item, CarryOrigin::Pointer, None),
            InputEvent::Drop { slot } => {
                if self.carry.item_from(CarryOrigin::Pointer).is_none() {
                    return Reaction::Ignored;
                }
                self.finish_carry(Some(slot))
            }
            InputEvent::DragCancel => self.cancel_carry(CarryOrigin::Pointer),
            InputEvent::TouchStart { item, touches } => match single_touch(&touches) {
                Some(point) => self.begin_carry(item, CarryOrigin::Touch, Some(point)),
                None => {
                    debug!(contacts = touches.len(), "ignoring touch start");
                    Reaction::Ignored
                }
            },
            InputEvent::TouchMove { touches } => self.move_touch(&touches, targets),
            InputEvent::TouchEnd { changed } => {
                if self.carry.item_from(CarryOrigin::Touch).is_none() {
                    return Reaction::Ignored;
                }
                let slot = changed
                    .first()
                    .filter(|point| point.is_valid())
                    .and_then(|point| targets.slot_at(*point));
                self.finish_carry(slot)
            }
            InputEvent::TouchCancel => self.cancel_carry(CarryOrigin::Touch),
        }
    }

    /// Submit a completed board right away (the "Matched" button).
    ///
    /// Returns `None` if the board is incomplete or already submitted.
    pub fn submit(&mut self, now: Duration) -> Option<SessionOutcome> {
        self.run_timers(now);
        if self.completed && !self.submitted && !self.torn_down {
            self.finalize(SubmitReason::Manual);
        }
        self.take_outcome()
    }

    /// Hand out the outcome once; later calls return `None`.
    pub fn take_outcome(&mut self) -> Option<SessionOutcome> {
        if self.delivered {
            return None;
        }
        let outcome = self.outcome.clone()?;
        self.delivered = true;
        Some(outcome)
    }

    /// Stop the session; pending timers and later events become no-ops.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.timers.clear();
        self.carry = Carry::Idle;
    }

    pub fn view(&self) -> SessionView {
        let hovered = self.carry.hovered();
        let slots = self
            .prompts
            .iter()
            .enumerate()
            .map(|(slot, prompt)| SlotView {
                slot,
                prompt: prompt.clone(),
                matched: self.matches.get(&slot).cloned(),
                feedback: self.feedback(slot),
                hovered: hovered == Some(slot),
            })
            .collect();

        let preview = self
            .carry
            .item_from(CarryOrigin::Touch)
            .and_then(|item| {
                item.position.map(|position| DragPreview {
                    answer: item.answer.clone(),
                    position,
                })
            });

        SessionView {
            slots,
            remaining_answers: self.presentation.clone(),
            carrying: self.carry.item().map(|item| item.answer.clone()),
            preview,
            remaining_secs: self.remaining_secs,
            clock: format_clock(self.remaining_secs),
            completed: self.completed,
            can_submit: self.completed && !self.submitted,
        }
    }

    // -----------------------------------------------------------------------
    // Carry lifecycle
    // -----------------------------------------------------------------------

    fn begin_carry(&mut self, index: usize, origin: CarryOrigin, position: Option<Point>) -> Reaction {
        if self.carry.is_active() {
            debug!(?origin, "carry already active, ignoring new start");
            return Reaction::Ignored;
        }
        let Some(answer) = self.presentation.get(index) else {
            debug!(index, "carry start on an answer no longer offered");
            return Reaction::Ignored;
        };
        let answer = answer.clone();
        self.carry = Carry::Active(CarriedItem {
            answer: answer.clone(),
            index,
            origin,
            position,
            hovered: None,
        });
        Reaction::CarryStarted { answer, origin }
    }

    fn move_touch(&mut self, touches: &[Point], targets: &dyn DropTargets) -> Reaction {
        if self.carry.item_from(CarryOrigin::Touch).is_none() {
            return Reaction::Ignored;
        }
        let Some(point) = touches.first().copied().filter(Point::is_valid) else {
            debug!("touch move without usable coordinates, dropping carry");
            self.carry = Carry::Idle;
            return Reaction::Released;
        };
        let hovered = targets.slot_at(point);
        if let Carry::Active(item) = &mut self.carry {
            item.position = Some(point);
            item.hovered = hovered;
        }
        Reaction::Hovering(hovered)
    }

    fn cancel_carry(&mut self, origin: CarryOrigin) -> Reaction {
        match origin {
            // A touch cancel always unwinds, whatever stream holds the carry.
            CarryOrigin::Touch if self.carry.is_active() => {
                self.carry = Carry::Idle;
                Reaction::Released
            }
            CarryOrigin::Pointer if self.carry.item_from(CarryOrigin::Pointer).is_some() => {
                self.carry = Carry::Idle;
                Reaction::Released
            }
            _ => Reaction::Ignored,
        }
    }

    fn finish_carry(&mut self, slot: Option<usize>) -> Reaction {
        let Carry::Active(item) = std::mem::take(&mut self.carry) else {
            return Reaction::Ignored;
        };
        let Some(slot) = slot.filter(|slot| *slot < self.prompts.len()) else {
            return Reaction::Released;
        };

        let already_matched = self.matches.contains_key(&slot);
        if !already_matched && item.answer == self.answers[slot] {
            self.matches.insert(slot, item.answer);
            self.feedback.insert(
                slot,
                FeedbackEntry {
                    kind: Feedback::Correct,
                    token: self.next_seq,
                },
            );
            if item.index < self.presentation.len() {
                self.presentation.remove(item.index);
            }
            let completed = self.check_completion();
            debug!(slot, completed, "correct match");
            Reaction::Matched { slot, completed }
        } else {
            let token = self.next_seq;
            self.feedback.insert(
                slot,
                FeedbackEntry {
                    kind: Feedback::Wrong,
                    token,
                },
            );
            self.schedule(self.config.wrong_feedback, TimerKind::ClearWrong { slot, token });
            debug!(slot, already_matched, "drop rejected");
            Reaction::Rejected { slot }
        }
    }

    fn check_completion(&mut self) -> bool {
        if !self.completed && self.matches.len() == self.prompts.len() {
            self.completed = true;
            self.schedule(self.config.completion_grace, TimerKind::Submit);
            info!(
                remaining_secs = self.remaining_secs,
                "all prompts matched, submitting after grace period"
            );
        }
        self.completed
    }

    // -----------------------------------------------------------------------
    // Timers and submission
    // -----------------------------------------------------------------------

    fn schedule(&mut self, delay: Duration, kind: TimerKind) {
        let timer = Timer {
            due: self.clock + delay,
            seq: self.next_seq,
            kind,
        };
        self.next_seq += 1;
        self.timers.push(Reverse(timer));
    }

    fn run_timers(&mut self, now: Duration) {
        if self.torn_down {
            return;
        }
        let now = now.max(self.clock);
        loop {
            match self.timers.peek() {
                Some(Reverse(timer)) if timer.due <= now => {}
                _ => break,
            }
            let Some(Reverse(timer)) = self.timers.pop() else {
                break;
            };
            self.clock = timer.due;
            self.fire(timer.kind);
        }
        self.clock = now;
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::CountdownTick => {
                if self.completed || self.submitted {
                    return;
                }
                self.remaining_secs = self.remaining_secs.saturating_sub(1);
                if self.remaining_secs == 0 {
                    self.finalize(SubmitReason::TimedOut);
                } else {
                    self.schedule(TICK, TimerKind::CountdownTick);
                }
            }
            TimerKind::ClearWrong { slot, token } => {
                let current = self.feedback.get(&slot);
                if matches!(current, Some(entry) if entry.kind == Feedback::Wrong && entry.token == token)
                {
                    self.feedback.remove(&slot);
                }
            }
            TimerKind::Submit => self.finalize(SubmitReason::Completed),
        }
    }

    fn finalize(&mut self, reason: SubmitReason) {
        if self.submitted {
            return;
        }
        self.submitted = true;
        self.carry = Carry::Idle;
        self.timers.clear();

        let correct_answers = self.matches.len() as u32;
        let total_questions = self.prompts.len() as u32;
        let time_taken = self.time_taken();
        let input = ScoreInput {
            correct_answers,
            total_questions,
            time_taken: time_taken as f64,
            time_limit: self.config.time_limit_secs as f64,
        };
        let score = match calculate_weighted_score(&input) {
            Ok(score) => score,
            Err(e) => {
                // `new` rejects empty prompt sets and zero limits, and every
                // match is one of the prompts, so this cannot fail.
                error!("scoring rejected session totals {input:?}: {e}");
                ScoreResult {
                    total_score: 0.0,
                    accuracy_score: 0.0,
                    time_score: 0.0,
                    accuracy_percentage: 0,
                }
            }
        };

        info!(
            ?reason,
            correct_answers,
            total_questions,
            time_taken,
            total_score = score.total_score,
            "matching session submitted"
        );
        self.outcome = Some(SessionOutcome {
            total_score: score.total_score,
            time_taken,
            correct_answers,
            total_questions,
            score,
            reason,
        });
    }
}
