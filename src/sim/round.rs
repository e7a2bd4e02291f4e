//! Round and match sequencing
//!
//! Menu -> RoundActive -> RoundResolving -> (RoundActive | MatchResult) -> Menu.
//! Every wait between phases is a timestamp stored in the phase itself and
//! checked by [`RoundMachine::update`], so a pending wait is abandoned simply
//! by leaving the phase.

use serde::Serialize;

use super::snail::CrashKind;
use crate::Player;
use crate::consts::NUM_PLAYERS;
use crate::error::ConfigError;
use crate::tuning::MatchTuning;

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchPhase {
    /// Waiting for any key
    Menu,
    /// Snails racing; `motion_at` is when movement unlocks, if still pending
    RoundActive { motion_at: Option<f64> },
    /// Showing the round result
    RoundResolving { since: f64 },
    /// Showing the match result
    MatchResult { since: f64 },
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchOutcome {
    Winner(Player),
    Tie,
}

/// A phase change the game layer must act on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// A round began; snails must be reset and trails cleared
    RoundStarted { round: u32, motion_delay: f32 },
    /// The start delay elapsed; snails may move
    MotionEnabled,
    /// A crash ended the round
    RoundResolved {
        crashed: Player,
        kind: CrashKind,
        winner: Option<Player>,
        last_round: bool,
    },
    MatchDecided(MatchOutcome),
    /// Back at the menu with scores cleared
    ReturnedToMenu,
}

/// Owns round/score counters and the phase timers
#[derive(Debug, Clone)]
pub struct RoundMachine {
    phase: MatchPhase,
    current_round: u32,
    num_rounds: u32,
    scores: [u32; NUM_PLAYERS],
    round_wait: f32,
    reset_wait: f32,
    next_round_delay: f32,
}

impl RoundMachine {
    pub fn new(tuning: &MatchTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self {
            phase: MatchPhase::Menu,
            current_round: 1,
            num_rounds: tuning.num_rounds,
            scores: [0; NUM_PLAYERS],
            round_wait: tuning.round_wait,
            reset_wait: tuning.reset_wait,
            next_round_delay: tuning.next_round_delay,
        })
    }

    /// Leave the menu and begin round one
    pub fn start_match(&mut self, now: f64) -> Option<Transition> {
        if self.phase != MatchPhase::Menu {
            return None;
        }
        Some(self.enter_round(now, self.reset_wait))
    }

    /// Resolve the active round after `crashed` died
    pub fn report_crash(
        &mut self,
        crashed: Player,
        kind: CrashKind,
        now: f64,
    ) -> Option<Transition> {
        if !matches!(self.phase, MatchPhase::RoundActive { .. }) {
            return None;
        }

        let winner = kind.credits_opponent().then(|| crashed.other());
        if let Some(winner) = winner {
            self.scores[winner.index()] += 1;
        }
        let last_round = self.current_round >= self.num_rounds;
        self.phase = MatchPhase::RoundResolving { since: now };

        log::info!(
            "Round {}/{} over: {} crashed ({:?}), winner {:?}, scores {:?}",
            self.current_round,
            self.num_rounds,
            crashed,
            kind,
            winner,
            self.scores
        );

        Some(Transition::RoundResolved {
            crashed,
            kind,
            winner,
            last_round,
        })
    }

    /// Advance any phase whose timer has run out
    pub fn update(&mut self, now: f64) -> Option<Transition> {
        match self.phase {
            MatchPhase::Menu => None,
            MatchPhase::RoundActive { motion_at } => match motion_at {
                Some(at) if now >= at => {
                    self.phase = MatchPhase::RoundActive { motion_at: None };
                    Some(Transition::MotionEnabled)
                }
                _ => None,
            },
            MatchPhase::RoundResolving { since } => {
                if now - since < f64::from(self.round_wait) {
                    return None;
                }
                if self.current_round < self.num_rounds {
                    self.current_round += 1;
                    Some(self.enter_round(now, self.next_round_delay))
                } else {
                    let outcome = self.outcome();
                    self.phase = MatchPhase::MatchResult { since: now };
                    log::info!("Match over: {:?}, scores {:?}", outcome, self.scores);
                    Some(Transition::MatchDecided(outcome))
                }
            }
            MatchPhase::MatchResult { since } => {
                if now - since < f64::from(self.reset_wait) {
                    return None;
                }
                self.enter_menu();
                Some(Transition::ReturnedToMenu)
            }
        }
    }

    /// Drop any pending wait and go straight back to the menu
    pub fn abort(&mut self) -> Transition {
        log::info!("Match aborted in {:?}", self.phase);
        self.enter_menu();
        Transition::ReturnedToMenu
    }

    /// Tie when every score matches; otherwise the highest (earliest on equal top)
    pub fn outcome(&self) -> MatchOutcome {
        let first = self.scores[0];
        if self.scores.iter().all(|&s| s == first) {
            return MatchOutcome::Tie;
        }
        let mut best = Player::One;
        for player in Player::ALL {
            if self.scores[player.index()] > self.scores[best.index()] {
                best = player;
            }
        }
        MatchOutcome::Winner(best)
    }

    fn enter_round(&mut self, now: f64, delay: f32) -> Transition {
        let motion_at = (delay > 0.0).then_some(now + f64::from(delay));
        self.phase = MatchPhase::RoundActive { motion_at };
        log::info!("Round {} of {} starting", self.current_round, self.num_rounds);
        Transition::RoundStarted {
            round: self.current_round,
            motion_delay: delay,
        }
    }

    fn enter_menu(&mut self) {
        self.phase = MatchPhase::Menu;
        self.current_round = 1;
        self.scores = [0; NUM_PLAYERS];
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn num_rounds(&self) -> u32 {
        self.num_rounds
    }

    pub fn scores(&self) -> [u32; NUM_PLAYERS] {
        self.scores
    }

    /// Whether snails may currently move
    pub fn motion_allowed(&self) -> bool {
        matches!(self.phase, MatchPhase::RoundActive { motion_at: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(num_rounds: u32) -> RoundMachine {
        RoundMachine::new(&MatchTuning {
            num_rounds,
            round_wait: 2.0,
            reset_wait: 2.0,
            next_round_delay: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn test_start_only_from_menu() {
        let mut m = machine(3);
        assert_eq!(
            m.start_match(0.0),
            Some(Transition::RoundStarted {
                round: 1,
                motion_delay: 2.0
            })
        );
        assert_eq!(m.start_match(0.5), None);
    }

    #[test]
    fn test_motion_unlocks_after_delay() {
        let mut m = machine(3);
        m.start_match(0.0);
        assert!(!m.motion_allowed());
        assert_eq!(m.update(1.5), None);
        assert_eq!(m.update(2.0), Some(Transition::MotionEnabled));
        assert!(m.motion_allowed());
        assert_eq!(m.update(2.5), None);
    }

    #[test]
    fn test_wall_crash_scores_nobody() {
        let mut m = machine(3);
        m.start_match(0.0);
        let t = m.report_crash(Player::One, CrashKind::Wall, 3.0).unwrap();
        assert!(matches!(t, Transition::RoundResolved { winner: None, .. }));
        assert_eq!(m.scores(), [0, 0]);
    }

    #[test]
    fn test_opponent_crash_credits_other() {
        let mut m = machine(3);
        m.start_match(0.0);
        m.report_crash(Player::Two, CrashKind::Snail, 3.0);
        assert_eq!(m.scores(), [1, 0]);
    }

    #[test]
    fn test_crash_outside_active_round_ignored() {
        let mut m = machine(3);
        assert_eq!(m.report_crash(Player::One, CrashKind::Slime, 0.0), None);
        m.start_match(0.0);
        m.report_crash(Player::One, CrashKind::Slime, 1.0);
        assert_eq!(m.report_crash(Player::Two, CrashKind::Slime, 1.1), None);
        assert_eq!(m.scores(), [0, 1]);
    }

    #[test]
    fn test_next_round_after_wait() {
        let mut m = machine(3);
        m.start_match(0.0);
        m.report_crash(Player::One, CrashKind::Slime, 5.0);
        assert_eq!(m.update(6.9), None);
        assert_eq!(
            m.update(7.0),
            Some(Transition::RoundStarted {
                round: 2,
                motion_delay: 0.0
            })
        );
        assert!(m.motion_allowed());
    }

    #[test]
    fn test_full_match_resets_scores_only_at_menu() {
        let mut m = machine(3);
        m.start_match(0.0);
        let mut now = 10.0;
        for _ in 0..3 {
            m.report_crash(Player::Two, CrashKind::Slime, now);
            now += 2.0;
            m.update(now);
            now += 1.0;
        }
        assert!(matches!(m.phase(), MatchPhase::MatchResult { .. }));
        assert_eq!(m.scores(), [3, 0]);

        assert_eq!(m.update(now), None);
        assert_eq!(m.scores(), [3, 0]);

        assert_eq!(m.update(now + 1.0), Some(Transition::ReturnedToMenu));
        assert_eq!(m.phase(), MatchPhase::Menu);
        assert_eq!(m.scores(), [0, 0]);
        assert_eq!(m.current_round(), 1);
    }

    #[test]
    fn test_outcome_tie_and_winner() {
        let mut m = machine(2);
        assert_eq!(m.outcome(), MatchOutcome::Tie);
        m.scores = [1, 2];
        assert_eq!(m.outcome(), MatchOutcome::Winner(Player::Two));
        m.scores = [3, 2];
        assert_eq!(m.outcome(), MatchOutcome::Winner(Player::One));
    }

    #[test]
    fn test_abort_cancels_pending_wait() {
        let mut m = machine(1);
        m.start_match(0.0);
        m.report_crash(Player::One, CrashKind::Snail, 1.0);
        assert_eq!(m.abort(), Transition::ReturnedToMenu);
        assert_eq!(m.update(100.0), None);
        assert_eq!(m.scores(), [0, 0]);
    }

    #[test]
    fn test_waits_hold_after_days_of_uptime() {
        let mut m = machine(2);
        let start = 524_288.0;
        m.start_match(start);
        assert_eq!(m.update(start + 1.99), None);
        assert_eq!(m.update(start + 2.0), Some(Transition::MotionEnabled));

        m.report_crash(Player::One, CrashKind::Wall, start + 10.0);
        assert_eq!(m.update(start + 11.0), None);
        assert!(matches!(
            m.update(start + 12.0),
            Some(Transition::RoundStarted { round: 2, .. })
        ));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        assert!(
            RoundMachine::new(&MatchTuning {
                num_rounds: 0,
                ..MatchTuning::default()
            })
            .is_err()
        );
    }
}
