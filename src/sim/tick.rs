//! Fixed timestep simulation tick
//!
//! One call advances both snails, expires their trails, resolves the
//! collision reports handed in for this tick, and lets the round machine
//! react. Nothing runs between ticks.

use std::fmt;

use super::round::{MatchOutcome, MatchPhase, RoundMachine, Transition};
use super::snail::{CollisionSignal, Pose, Snail, SnailEvent, SnailInput};
use super::trail::Trail;
use crate::consts::{NUM_PLAYERS, SIM_DT};
use crate::error::ConfigError;
use crate::sinks::{BoundarySink, CueSink, PresentationSink, TerritorySink};
use crate::tuning::Tuning;
use crate::{Color, Player};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Per-snail steering and boost
    pub players: [SnailInput; NUM_PLAYERS],
    /// Any key pressed this tick (starts a match from the menu)
    pub any_key: bool,
    /// Quit requested
    pub quit: bool,
    /// Collision reports from the physics layer, applied in order
    pub collisions: Vec<(Player, CollisionSignal)>,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Snail(Player, SnailEvent),
    Round(Transition),
}

/// Result of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// The host should shut down
    pub quit: bool,
}

/// Sinks for one snail: its trail renderer and its cue player
pub struct SnailSinks {
    pub boundary: Box<dyn BoundarySink>,
    pub cues: Box<dyn CueSink>,
}

impl Default for SnailSinks {
    fn default() -> Self {
        Self {
            boundary: Box::new(()),
            cues: Box::new(()),
        }
    }
}

/// All collaborators the game talks to
pub struct GameSinks {
    pub snails: [SnailSinks; NUM_PLAYERS],
    pub territory: Box<dyn TerritorySink>,
    pub presentation: Box<dyn PresentationSink>,
}

impl Default for GameSinks {
    fn default() -> Self {
        Self {
            snails: Default::default(),
            territory: Box::new(()),
            presentation: Box::new(()),
        }
    }
}

/// Complete game: two snails, their trails and the match state
pub struct Game {
    tuning: Tuning,
    round: RoundMachine,
    snails: [Snail; NUM_PLAYERS],
    territory: Box<dyn TerritorySink>,
    presentation: Box<dyn PresentationSink>,
    /// Ticks since creation; `now` is derived from this so the clock never drifts
    time_ticks: u64,
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("time_ticks", &self.time_ticks)
            .field("round", &self.round)
            .field("snails", &self.snails)
            .finish()
    }
}

impl Game {
    /// Build a game at the menu. Invalid tuning is refused here so no round can start with it.
    pub fn new(tuning: Tuning, sinks: GameSinks, seed: u64) -> Result<Self, ConfigError> {
        if let Err(err) = tuning.validate() {
            log::warn!("Refusing to start: {}", err);
            return Err(err);
        }

        let round = RoundMachine::new(&tuning.rounds)?;
        let GameSinks {
            snails: [one, two],
            territory,
            presentation,
        } = sinks;
        let snails = [
            Self::build_snail(&tuning, Player::One, one, seed)?,
            Self::build_snail(&tuning, Player::Two, two, seed)?,
        ];

        let mut game = Self {
            tuning,
            round,
            snails,
            territory,
            presentation,
            time_ticks: 0,
        };
        for player in Player::ALL {
            let steps = game.snail(player).boost_steps();
            let color = game.color(player);
            game.presentation.setup(player, steps, color);
        }
        game.enter_menu();
        Ok(game)
    }

    fn build_snail(
        tuning: &Tuning,
        player: Player,
        sinks: SnailSinks,
        seed: u64,
    ) -> Result<Snail, ConfigError> {
        let trail = Trail::new(&tuning.trail, sinks.boundary)?;
        // Separate RNG streams so the two snails never splat in lockstep
        let snail_seed = seed
            .wrapping_add(player.index() as u64)
            .wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Snail::new(player, &tuning.snail, trail, sinks.cues, snail_seed)
    }

    /// Advance the game by one fixed timestep.
    ///
    /// `dt` scales motion; timers run on the tick count at `SIM_DT` per tick.
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> TickReport {
        let mut report = TickReport {
            quit: input.quit,
            ..Default::default()
        };
        self.time_ticks += 1;
        let now = self.time();

        if input.any_key {
            if let Some(transition) = self.round.start_match(now) {
                self.apply(transition, &mut report);
            }
        }

        let mut snail_events: Vec<(Player, SnailEvent)> = Vec::new();
        for (snail, snail_input) in self.snails.iter_mut().zip(&input.players) {
            let update = snail.update(snail_input, now, dt);
            let player = snail.player();
            snail_events.extend(update.events.into_iter().map(|e| (player, e)));
        }

        for snail in &mut self.snails {
            snail.trail_mut().tick(now);
        }

        for &(player, signal) in &input.collisions {
            if let Some(event) = self.snails[player.index()].handle_collision(signal) {
                snail_events.push((player, event));
            }
        }

        for (player, event) in snail_events {
            report.events.push(GameEvent::Snail(player, event.clone()));
            self.dispatch(player, event, now, &mut report);
        }

        if let Some(transition) = self.round.update(now) {
            self.apply(transition, &mut report);
        }

        report
    }

    /// Abandon the current match and return to the menu
    pub fn reset(&mut self) -> TickReport {
        let mut report = TickReport::default();
        let transition = self.round.abort();
        self.apply(transition, &mut report);
        report
    }

    fn dispatch(&mut self, player: Player, event: SnailEvent, now: f64, report: &mut TickReport) {
        match event {
            SnailEvent::ChargeChanged(level) => self.presentation.boost_charge(player, level),
            SnailEvent::ShapeReady(region) => {
                let color = self.color(player);
                self.territory.materialize(&region, player, color);
            }
            SnailEvent::Crashed(kind) => {
                if let Some(transition) = self.round.report_crash(player, kind, now) {
                    self.apply(transition, report);
                }
            }
            SnailEvent::BoostStarted { .. } | SnailEvent::ShapeRejected(_) => {}
        }
    }

    fn apply(&mut self, transition: Transition, report: &mut TickReport) {
        match transition {
            Transition::RoundStarted {
                round,
                motion_delay,
            } => {
                self.start_round(round);
                self.set_motion(motion_delay <= 0.0);
            }
            Transition::MotionEnabled => self.set_motion(true),
            Transition::RoundResolved { winner, .. } => {
                self.set_motion(false);
                match winner {
                    Some(winner) => {
                        let text = format!("{winner} won!");
                        let color = self.color(winner);
                        self.presentation.info(Some((text.as_str(), color)));
                    }
                    None => {
                        let neutral = self.tuning.neutral_color;
                        self.presentation.info(Some(("Snail Crash!", neutral)));
                    }
                }
                self.presentation.scores(self.round.scores());
            }
            Transition::MatchDecided(outcome) => match outcome {
                MatchOutcome::Winner(winner) => {
                    let text = format!("Game over! {winner} won!");
                    let color = self.color(winner);
                    self.presentation.info(Some((text.as_str(), color)));
                }
                MatchOutcome::Tie => {
                    let neutral = self.tuning.neutral_color;
                    self.presentation.info(Some(("Tie!", neutral)));
                }
            },
            Transition::ReturnedToMenu => self.enter_menu(),
        }
        report.events.push(GameEvent::Round(transition));
    }

    fn start_round(&mut self, round: u32) {
        self.place_snails();
        self.territory.reset();
        let text = format!("Round {} : {}", round, self.round.num_rounds());
        self.presentation.round_text(&text);
        self.presentation.info(None);
    }

    fn enter_menu(&mut self) {
        self.place_snails();
        self.set_motion(false);
        self.territory.reset();
        self.presentation.info(None);
        self.presentation.scores(self.round.scores());
    }

    fn place_snails(&mut self) {
        for snail in &mut self.snails {
            let start = &self.tuning.players[snail.player().index()];
            snail.reset(Pose {
                pos: start.start_position,
                angle: start.start_orientation,
            });
            snail.trail_mut().clear();
        }
    }

    fn set_motion(&mut self, enabled: bool) {
        for snail in &mut self.snails {
            snail.set_enabled(enabled);
        }
    }

    fn color(&self, player: Player) -> Color {
        self.tuning.players[player.index()].color
    }

    /// Simulation time in seconds
    pub fn time(&self) -> f64 {
        self.time_ticks as f64 * f64::from(SIM_DT)
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn phase(&self) -> MatchPhase {
        self.round.phase()
    }

    pub fn round(&self) -> &RoundMachine {
        &self.round
    }

    pub fn scores(&self) -> [u32; NUM_PLAYERS] {
        self.round.scores()
    }

    pub fn snail(&self, player: Player) -> &Snail {
        &self.snails[player.index()]
    }

    pub fn snails(&self) -> &[Snail; NUM_PLAYERS] {
        &self.snails
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }
}
