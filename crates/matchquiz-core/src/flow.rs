//! Screen routing for a full game.
//!
//! Registration → level selection → memorizing → matching → results, then
//! back to registration. Like the matching session, the flow runs on a
//! virtual clock: callers pass the elapsed time since the flow was created.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::carry::InputEvent;
use crate::config::QuizConfig;
use crate::error::{FlowError, RegistrationError};
use crate::model::{ContentBank, Level};
use crate::report::{GameReport, Player};
use crate::session::{MatchingSession, Reaction, SessionOutcome};
use crate::targets::DropTargets;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Registration,
    Selection,
    Memorizing,
    Matching,
    Results,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Registration => "registration",
            Screen::Selection => "selection",
            Screen::Memorizing => "memorizing",
            Screen::Matching => "matching",
            Screen::Results => "results",
        };
        f.write_str(name)
    }
}

/// Check an email the way the registration form does, returning the player.
pub fn register_player(email: &str) -> Result<Player, RegistrationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(RegistrationError::EmailRequired);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(RegistrationError::InvalidEmail(email.to_string()));
    }
    let name = email.split('@').next().unwrap_or(email).to_string();
    Ok(Player {
        name,
        email: email.to_string(),
    })
}

#[derive(Debug)]
enum FlowState {
    Registration,
    Selection {
        player: Player,
    },
    Memorizing {
        player: Player,
        level: Level,
        entered_at: Duration,
    },
    Matching {
        player: Player,
        level: Level,
        entered_at: Duration,
        session: Box<MatchingSession>,
    },
    Results {
        report: GameReport,
        entered_at: Duration,
    },
}

/// Owns one player's pass through the game.
pub struct GameFlow {
    config: QuizConfig,
    bank: ContentBank,
    rng: StdRng,
    state: FlowState,
    clock: Duration,
}

impl GameFlow {
    pub fn new(config: QuizConfig, bank: ContentBank) -> Self {
        Self::with_rng(config, bank, StdRng::from_entropy())
    }

    /// Deterministic answer shuffling, for replays and tests.
    pub fn with_seed(config: QuizConfig, bank: ContentBank, seed: u64) -> Self {
        Self::with_rng(config, bank, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: QuizConfig, bank: ContentBank, rng: StdRng) -> Self {
        Self {
            config,
            bank,
            rng,
            state: FlowState::Registration,
            clock: Duration::ZERO,
        }
    }

    pub fn screen(&self) -> Screen {
        screen_of(&self.state)
    }

    pub fn player(&self) -> Option<&Player> {
        match &self.state {
            FlowState::Registration => None,
            FlowState::Selection { player }
            | FlowState::Memorizing { player, .. }
            | FlowState::Matching { player, .. } => Some(player),
            FlowState::Results { report, .. } => Some(&report.player),
        }
    }

    /// Cards to show while memorizing.
    pub fn memorizing_content(&self) -> &[String] {
        match &self.state {
            FlowState::Memorizing { level, .. } => self
                .bank
                .level(*level)
                .map(|content| content.memorizing.as_slice())
                .unwrap_or_default(),
            _ => &[],
        }
    }

    /// Seconds left on the current screen's countdown, if it has one.
    pub fn countdown(&self) -> Option<u32> {
        match &self.state {
            FlowState::Memorizing { entered_at, .. } => Some(remaining(
                self.config.memorizing_time_secs,
                self.clock.saturating_sub(*entered_at),
            )),
            FlowState::Matching { session, .. } => Some(session.remaining_secs()),
            FlowState::Results { entered_at, .. } => Some(remaining(
                self.config.results_restart_secs,
                self.clock.saturating_sub(*entered_at),
            )),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&MatchingSession> {
        match &self.state {
            FlowState::Matching { session, .. } => Some(session),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&GameReport> {
        match &self.state {
            FlowState::Results { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn register(&mut self, email: &str) -> Result<&Player, FlowError> {
        self.require(Screen::Registration)?;
        let player = register_player(email)?;
        info!(name = %player.name, "player registered");
        self.state = FlowState::Selection { player };
        match &self.state {
            FlowState::Selection { player } => Ok(player),
            other => Err(unexpected(Screen::Selection, other)),
        }
    }

    pub fn select_level(&mut self, now: Duration, level: Level) -> Result<(), FlowError> {
        let player = match &self.state {
            FlowState::Selection { player } => player.clone(),
            other => return Err(unexpected(Screen::Selection, other)),
        };
        if self.bank.level(level).is_none() {
            return Err(FlowError::MissingLevel(level.to_string()));
        }
        self.tick_clock(now);
        self.state = FlowState::Memorizing {
            player,
            level,
            entered_at: self.clock,
        };
        Ok(())
    }

    /// Leave the memorizing screen before its countdown ends.
    pub fn skip_memorizing(&mut self, now: Duration) -> Result<(), FlowError> {
        self.require(Screen::Memorizing)?;
        self.tick_clock(now);
        self.start_matching(self.clock)
    }

    pub fn handle_input(
        &mut self,
        now: Duration,
        event: InputEvent,
        targets: &dyn DropTargets,
    ) -> Result<Reaction, FlowError> {
        self.require(Screen::Matching)?;
        self.tick_clock(now);
        match &mut self.state {
            FlowState::Matching {
                entered_at,
                session,
                ..
            } => Ok(session.handle(self.clock.saturating_sub(*entered_at), event, targets)),
            other => Err(unexpected(Screen::Matching, other)),
        }
    }

    /// Press the submit button on a completed board.
    pub fn submit(&mut self, now: Duration) -> Result<Option<GameReport>, FlowError> {
        self.require(Screen::Matching)?;
        self.tick_clock(now);
        let outcome = match &mut self.state {
            FlowState::Matching {
                entered_at,
                session,
                ..
            } => session.submit(self.clock.saturating_sub(*entered_at)),
            other => return Err(unexpected(Screen::Matching, other)),
        };
        outcome
            .map(|outcome| self.finish_matching(&outcome))
            .transpose()
    }

    /// Run countdowns up to `now`.
    ///
    /// Returns the report when a matching session is submitted.
    pub fn advance(&mut self, now: Duration) -> Result<Option<GameReport>, FlowError> {
        self.tick_clock(now);
        match &mut self.state {
            FlowState::Memorizing { entered_at, .. } => {
                let ends_at = *entered_at + secs(self.config.memorizing_time_secs);
                if self.clock >= ends_at {
                    self.start_matching(ends_at)?;
                    return self.advance(now);
                }
                Ok(None)
            }
            FlowState::Matching {
                entered_at,
                session,
                ..
            } => {
                let outcome = session.advance_to(self.clock.saturating_sub(*entered_at));
                outcome
                    .map(|outcome| self.finish_matching(&outcome))
                    .transpose()
            }
            FlowState::Results { entered_at, .. } => {
                let ends_at = *entered_at + secs(self.config.results_restart_secs);
                if self.clock >= ends_at {
                    self.restart();
                }
                Ok(None)
            }
            FlowState::Registration | FlowState::Selection { .. } => Ok(None),
        }
    }

    /// Back to registration, dropping any game in progress.
    pub fn restart(&mut self) {
        if let FlowState::Matching { session, .. } = &mut self.state {
            session.teardown();
        }
        self.state = FlowState::Registration;
    }

    fn start_matching(&mut self, entered_at: Duration) -> Result<(), FlowError> {
        let (player, level) = match &self.state {
            FlowState::Memorizing { player, level, .. } => (player.clone(), *level),
            other => return Err(unexpected(Screen::Memorizing, other)),
        };
        let content = self
            .bank
            .level(level)
            .ok_or_else(|| FlowError::MissingLevel(level.to_string()))?;
        let session = MatchingSession::new(
            content.left.clone(),
            content.right.clone(),
            self.config.session(),
            &mut self.rng,
        )?;
        self.state = FlowState::Matching {
            player,
            level,
            entered_at,
            session: Box::new(session),
        };
        Ok(())
    }

    fn finish_matching(&mut self, outcome: &SessionOutcome) -> Result<GameReport, FlowError> {
        let (player, level) = match &self.state {
            FlowState::Matching { player, level, .. } => (player.clone(), *level),
            other => return Err(unexpected(Screen::Matching, other)),
        };
        let report = GameReport::new(player, level, outcome);
        info!(summary = %report.summary(), "game finished");
        self.state = FlowState::Results {
            report: report.clone(),
            entered_at: self.clock,
        };
        Ok(report)
    }

    fn require(&self, expected: Screen) -> Result<(), FlowError> {
        if self.screen() == expected {
            Ok(())
        } else {
            Err(unexpected(expected, &self.state))
        }
    }

    fn tick_clock(&mut self, now: Duration) {
        self.clock = self.clock.max(now);
    }
}

fn screen_of(state: &FlowState) -> Screen {
    match state {
        FlowState::Registration => Screen::Registration,
        FlowState::Selection { .. } => Screen::Selection,
        FlowState::Memorizing { .. } => Screen::Memorizing,
        FlowState::Matching { .. } => Screen::Matching,
        FlowState::Results { .. } => Screen::Results,
    }
}

fn unexpected(expected: Screen, state: &FlowState) -> FlowError {
    FlowError::UnexpectedScreen {
        expected,
        actual: screen_of(state),
    }
}

fn secs(s: u32) -> Duration {
    Duration::from_secs(u64::from(s))
}

fn remaining(limit: u32, elapsed: Duration) -> u32 {
    limit.saturating_sub(u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SubmitReason;
    use crate::targets::NoTargets;

    fn flow() -> GameFlow {
        GameFlow::with_seed(QuizConfig::default(), ContentBank::builtin(), 42)
    }

    fn at(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn email_validation() {
        assert_eq!(register_player("  "), Err(RegistrationError::EmailRequired));
        assert!(matches!(
            register_player("not-an-email"),
            Err(RegistrationError::InvalidEmail(_))
        ));
        assert!(register_player("a b@c.d").is_err());
        let player = register_player(" priya@shop.in ").unwrap();
        assert_eq!(player.name, "priya");
        assert_eq!(player.email, "priya@shop.in");
    }

    #[test]
    fn screens_must_come_in_order() {
        let mut flow = flow();
        let err = flow.select_level(at(0), Level::NewToAds).unwrap_err();
        assert!(matches!(
            err,
            FlowError::UnexpectedScreen {
                expected: Screen::Selection,
                actual: Screen::Registration
            }
        ));
        assert!(flow.register("bad").is_err());
        assert_eq!(flow.screen(), Screen::Registration);
    }

    #[test]
    fn memorizing_countdown_starts_matching() {
        let mut flow = flow();
        flow.register("asha@example.com").unwrap();
        flow.select_level(at(5), Level::AdExpert).unwrap();
        assert_eq!(flow.screen(), Screen::Memorizing);
        assert_eq!(flow.memorizing_content().len(), 7);

        flow.advance(at(50)).unwrap();
        assert_eq!(flow.countdown(), Some(45));

        flow.advance(at(95)).unwrap();
        assert_eq!(flow.screen(), Screen::Matching);
        let session = flow.session().unwrap();
        assert_eq!(session.prompts().len(), 8);
        assert_eq!(session.remaining_secs(), 120);
    }

    #[test]
    fn full_game_reaches_results_and_restarts() {
        let mut flow = flow();
        flow.register("asha@example.com").unwrap();
        flow.select_level(at(0), Level::NewToAds).unwrap();
        flow.skip_memorizing(at(10)).unwrap();

        let answers = flow.session().unwrap().answers().to_vec();
        let mut t = 10;
        for (slot, answer) in answers.iter().enumerate() {
            t += 2;
            let item = flow.session().unwrap().position_of(answer).unwrap();
            flow.handle_input(at(t), InputEvent::DragStart { item }, &NoTargets)
                .unwrap();
            flow.handle_input(at(t), InputEvent::Drop { slot }, &NoTargets)
                .unwrap();
        }
        assert!(flow.session().unwrap().is_completed());

        // Pressing submit on the final drop beats the grace timer.
        let report = flow.submit(at(t)).unwrap().expect("completed board");
        assert_eq!(report.reason, SubmitReason::Manual);
        assert_eq!(report.correct_answers, 6);
        assert_eq!(report.level, Level::NewToAds);
        assert_eq!(flow.screen(), Screen::Results);
        assert_eq!(flow.report().unwrap().id, report.id);

        // The grace timer died with the session, so nothing else is reported.
        assert!(flow.advance(at(t + 1)).unwrap().is_none());
        flow.advance(at(t + 5)).unwrap();
        assert_eq!(flow.screen(), Screen::Registration);
    }

    #[test]
    fn matching_timeout_produces_report() {
        let mut flow = flow();
        flow.register("asha@example.com").unwrap();
        flow.select_level(at(0), Level::NewToAds).unwrap();
        let report = flow
            .advance(at(90 + 120))
            .unwrap()
            .expect("matching timed out");
        assert_eq!(report.reason, SubmitReason::TimedOut);
        assert_eq!(report.time_taken_secs, 120);
        assert!(!report.is_success());
        assert_eq!(flow.screen(), Screen::Results);
    }

    #[test]
    fn missing_level_is_reported() {
        let mut bank = ContentBank::builtin();
        bank.levels.remove(&Level::AdExpert);
        let mut flow = GameFlow::with_seed(QuizConfig::default(), bank, 1);
        flow.register("asha@example.com").unwrap();
        assert!(matches!(
            flow.select_level(at(0), Level::AdExpert),
            Err(FlowError::MissingLevel(_))
        ));
    }
}
