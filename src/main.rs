//! Slime Yard headless runner
//!
//! Plays one full match between two scripted bots on a square arena and logs
//! what happens. Collision detection here is a crude stand-in for a physics
//! engine: enough to end rounds and trigger territory claims.

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use slime_yard::consts::{MAX_SUBSTEPS, MIN_SHAPE_POINT_COUNT, SIM_DT};
use slime_yard::sim::{
    ChargeLevel, CollisionSignal, CrashKind, Game, GameEvent, GameSinks, MatchOutcome, SnailEvent,
    SnailInput, SnailSinks, TerritoryRegion, TickInput, Transition,
};
use slime_yard::sinks::{Cue, CueSink, PresentationSink, TerritorySink};
use slime_yard::{Color, Player, Tuning, heading};

/// Half the arena's side length
const ARENA_HALF: f32 = 6.0;
/// Snail body radius used by the probe
const BODY_RADIUS: f32 = 0.15;
/// How close to slime counts as touching it
const SLIME_RADIUS: f32 = 0.08;
/// Distance from the wall at which bots start steering home
const WALL_MARGIN: f32 = 1.5;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// RNG seed for bots and splats
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Override the number of rounds
    #[arg(long)]
    rounds: Option<u32>,
    /// JSON tuning file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop after this much simulated time
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f32,
    /// Print a JSON summary to stdout when done
    #[arg(long)]
    summary: bool,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    seed: u64,
    /// Effective tuning, so a run can be reproduced from its summary
    tuning: Tuning,
    sim_seconds: f64,
    rounds_played: u32,
    final_scores: [u32; 2],
    outcome: Option<MatchOutcome>,
    crashes: Vec<(Player, CrashKind)>,
    claims: [u32; 2],
    claimed_area: [f32; 2],
    rejected_claims: u32,
    boosts: u32,
}

/// Logs HUD updates
struct LogPresentation;

impl PresentationSink for LogPresentation {
    fn setup(&mut self, player: Player, boost_steps: u32, _color: Color) {
        log::debug!("[hud] {} gauge has {} steps", player, boost_steps);
    }

    fn round_text(&mut self, text: &str) {
        log::info!("[hud] {}", text);
    }

    fn info(&mut self, message: Option<(&str, Color)>) {
        if let Some((text, _)) = message {
            log::info!("[hud] {}", text);
        }
    }

    fn scores(&mut self, scores: [u32; 2]) {
        log::info!("[hud] score {} - {}", scores[0], scores[1]);
    }

    fn boost_charge(&mut self, player: Player, level: ChargeLevel) {
        log::trace!("[hud] {} gauge {}", player, level.as_i32());
    }
}

/// Logs sound cues; splats and animation cues have nothing to show headless
struct LogCues(Player);

impl CueSink for LogCues {
    fn cue(&mut self, cue: Cue) {
        if let Cue::Sound(sound) = cue {
            log::debug!("[sfx] {} {}", self.0, sound.as_str());
        }
    }
}

/// Keeps claimed territory alive for the probe and tallies it for the summary
#[derive(Clone, Default)]
struct TerritoryPool(Rc<RefCell<Vec<(Player, TerritoryRegion)>>>);

impl TerritorySink for TerritoryPool {
    fn materialize(&mut self, region: &TerritoryRegion, owner: Player, _color: Color) {
        self.0.borrow_mut().push((owner, region.clone()));
    }

    fn reset(&mut self) {
        self.0.borrow_mut().clear();
    }
}

fn point_in_polygon(p: Vec2, poly: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = poly.len().wrapping_sub(1);
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Toy collision detection standing in for the physics layer
#[derive(Default)]
struct ArenaProbe {
    inside_own: [bool; 2],
}

impl ArenaProbe {
    fn detect(&mut self, game: &Game, pool: &TerritoryPool) -> Vec<(Player, CollisionSignal)> {
        let mut signals = Vec::new();
        let [one, two] = game.snails();
        if !one.is_enabled() {
            self.inside_own = [false; 2];
            return signals;
        }

        if one.pos().distance(two.pos()) < BODY_RADIUS * 2.0 {
            signals.push((Player::One, CollisionSignal::OpponentCrash));
        }

        for snail in [one, two] {
            let player = snail.player();
            let pos = snail.pos();
            if pos.x.abs() > ARENA_HALF || pos.y.abs() > ARENA_HALF {
                signals.push((player, CollisionSignal::WallCrash));
                continue;
            }

            let opponent = game.snail(player.other());
            let hit_slime = opponent
                .trail()
                .samples()
                .iter()
                .any(|s| s.pos.distance(pos) < SLIME_RADIUS);
            let hit_blob = pool
                .0
                .borrow()
                .iter()
                .any(|(owner, region)| *owner != player && point_in_polygon(pos, &region.points));
            if hit_slime || hit_blob {
                signals.push((player, CollisionSignal::OpponentSlime));
                continue;
            }

            let own = snail.trail().samples();
            let old = own.len().saturating_sub(MIN_SHAPE_POINT_COUNT);
            let inside = own[..old].iter().any(|s| s.pos.distance(pos) < SLIME_RADIUS * 2.0);
            let was_inside = std::mem::replace(&mut self.inside_own[player.index()], inside);
            if was_inside && !inside {
                signals.push((player, CollisionSignal::OwnTrailExit(pos)));
            }
        }
        signals
    }
}

/// Wandering bot that steers away from walls and boosts now and then
fn bot_input(game: &Game, player: Player, rng: &mut Pcg32) -> SnailInput {
    let snail = game.snail(player);
    let pos = snail.pos();
    let near_wall =
        pos.x.abs() > ARENA_HALF - WALL_MARGIN || pos.y.abs() > ARENA_HALF - WALL_MARGIN;

    let turn = if near_wall {
        let to_center = -pos;
        if heading(snail.angle()).perp_dot(to_center) > 0.0 { 1.0 } else { -1.0 }
    } else {
        let wobble = (game.time() * 1.3 + player.index() as f64 * 2.0).sin() as f32;
        (wobble * 0.9 + rng.random_range(-0.3..0.3)).clamp(-1.0, 1.0)
    };

    SnailInput {
        turn,
        boost: !near_wall && rng.random::<f32>() < 0.01,
    }
}

fn run(cli: &Cli) -> Result<Summary, slime_yard::ConfigError> {
    let mut tuning = match &cli.config {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    if let Some(rounds) = cli.rounds {
        tuning.rounds.num_rounds = rounds;
    }

    let pool = TerritoryPool::default();
    let sinks = GameSinks {
        snails: Player::ALL.map(|player| SnailSinks {
            cues: Box::new(LogCues(player)),
            ..Default::default()
        }),
        territory: Box::new(pool.clone()),
        presentation: Box::new(LogPresentation),
    };
    let mut game = Game::new(tuning, sinks, cli.seed)?;
    let mut rng = Pcg32::seed_from_u64(cli.seed ^ 0xB07);
    let mut probe = ArenaProbe::default();
    let mut summary = Summary {
        seed: cli.seed,
        tuning: game.tuning().clone(),
        ..Default::default()
    };

    // The runner has no frame clock; batch ticks like a renderer would
    let mut first = true;
    'frames: while game.time() < f64::from(cli.max_seconds) {
        for _ in 0..MAX_SUBSTEPS {
            let input = TickInput {
                players: [
                    bot_input(&game, Player::One, &mut rng),
                    bot_input(&game, Player::Two, &mut rng),
                ],
                any_key: std::mem::take(&mut first),
                quit: false,
                collisions: probe.detect(&game, &pool),
            };
            let report = game.tick(&input, SIM_DT);

            for event in report.events {
                match event {
                    GameEvent::Snail(player, SnailEvent::Crashed(kind)) => {
                        summary.crashes.push((player, kind));
                    }
                    GameEvent::Snail(player, SnailEvent::ShapeReady(region)) => {
                        summary.claims[player.index()] += 1;
                        summary.claimed_area[player.index()] += region.area();
                    }
                    GameEvent::Snail(_, SnailEvent::ShapeRejected(_)) => {
                        summary.rejected_claims += 1;
                    }
                    GameEvent::Snail(_, SnailEvent::BoostStarted { .. }) => summary.boosts += 1,
                    GameEvent::Round(Transition::RoundResolved { .. }) => {
                        summary.rounds_played += 1;
                    }
                    GameEvent::Round(Transition::MatchDecided(outcome)) => {
                        summary.outcome = Some(outcome);
                        summary.final_scores = game.scores();
                    }
                    GameEvent::Round(Transition::ReturnedToMenu) => break 'frames,
                    _ => {}
                }
            }
        }
    }

    summary.sim_seconds = game.time();
    if summary.outcome.is_none() {
        log::warn!("Match did not finish within {:.0}s", cli.max_seconds);
        summary.final_scores = game.scores();
    }
    Ok(summary)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Slime Yard (headless) starting with seed {}", cli.seed);

    let summary = match run(&cli) {
        Ok(summary) => summary,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "Finished after {:.1}s: {:?}, scores {:?}",
        summary.sim_seconds,
        summary.outcome,
        summary.final_scores
    );
    if cli.summary {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                log::error!("failed to encode summary: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
