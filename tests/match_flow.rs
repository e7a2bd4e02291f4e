//! Whole-match flows driven through `Game::tick` with recording sinks

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use slime_yard::consts::SIM_DT;
use slime_yard::sim::{
    ChargeLevel, CollisionSignal, Game, GameEvent, GameSinks, MatchOutcome, MatchPhase, SnailEvent,
    SnailInput, SnailSinks, TerritoryRegion, TickInput, TickReport, Transition,
};
use slime_yard::sinks::{BoundarySink, PresentationSink, TerritorySink};
use slime_yard::{Color, Player, Tuning};

#[derive(Default)]
struct Seen {
    infos: Vec<Option<String>>,
    round_texts: Vec<String>,
    scores: Vec<[u32; 2]>,
    regions: Vec<(Player, TerritoryRegion, Color)>,
    territory_resets: u32,
    collidable: Vec<bool>,
    gauges: Vec<(Player, u32, Color)>,
    charges: Vec<(Player, ChargeLevel)>,
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Seen>>);

impl PresentationSink for Recorder {
    fn setup(&mut self, player: Player, boost_steps: u32, color: Color) {
        self.0.borrow_mut().gauges.push((player, boost_steps, color));
    }

    fn round_text(&mut self, text: &str) {
        self.0.borrow_mut().round_texts.push(text.to_owned());
    }

    fn info(&mut self, message: Option<(&str, Color)>) {
        self.0
            .borrow_mut()
            .infos
            .push(message.map(|(text, _)| text.to_owned()));
    }

    fn scores(&mut self, scores: [u32; 2]) {
        self.0.borrow_mut().scores.push(scores);
    }

    fn boost_charge(&mut self, player: Player, level: ChargeLevel) {
        self.0.borrow_mut().charges.push((player, level));
    }
}

impl TerritorySink for Recorder {
    fn materialize(&mut self, region: &TerritoryRegion, owner: Player, color: Color) {
        self.0
            .borrow_mut()
            .regions
            .push((owner, region.clone(), color));
    }

    fn reset(&mut self) {
        self.0.borrow_mut().territory_resets += 1;
    }
}

impl BoundarySink for Recorder {
    fn set_collidable(&mut self, enabled: bool) {
        self.0.borrow_mut().collidable.push(enabled);
    }
}

fn game_with(tuning: Tuning, rec: &Recorder) -> Game {
    let sinks = GameSinks {
        snails: [
            SnailSinks {
                boundary: Box::new(rec.clone()),
                cues: Box::new(()),
            },
            SnailSinks::default(),
        ],
        territory: Box::new(rec.clone()),
        presentation: Box::new(rec.clone()),
    };
    Game::new(tuning, sinks, 2024).unwrap()
}

fn run_for(game: &mut Game, seconds: f32) -> Vec<GameEvent> {
    let ticks = (seconds / SIM_DT).ceil() as u32;
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(game.tick(&TickInput::default(), SIM_DT).events);
    }
    events
}

fn collide(game: &mut Game, player: Player, signal: CollisionSignal) -> TickReport {
    game.tick(
        &TickInput {
            collisions: vec![(player, signal)],
            ..Default::default()
        },
        SIM_DT,
    )
}

fn start(game: &mut Game) {
    game.tick(
        &TickInput {
            any_key: true,
            ..Default::default()
        },
        SIM_DT,
    );
    run_for(game, 2.1);
    assert!(game.snail(Player::One).is_enabled());
}

#[test]
fn three_round_match_scores_and_returns_to_menu() {
    let rec = Recorder::default();
    let mut game = game_with(Tuning::default(), &rec);
    start(&mut game);
    assert_eq!(rec.0.borrow().round_texts, vec!["Round 1 : 3".to_owned()]);

    // Round 1: Player1 runs into Player2, so Player2 scores
    collide(&mut game, Player::One, CollisionSignal::OpponentCrash);
    assert_eq!(game.scores(), [0, 1]);
    assert!(!game.snail(Player::One).is_enabled());
    assert!(!game.snail(Player::Two).is_enabled());
    assert_eq!(
        rec.0.borrow().infos.last(),
        Some(&Some("Player2 won!".to_owned()))
    );

    let events = run_for(&mut game, 2.05);
    assert!(events.contains(&GameEvent::Round(Transition::RoundStarted {
        round: 2,
        motion_delay: 0.0
    })));
    assert!(game.snail(Player::Two).is_enabled());

    // Round 2: wall crash scores nobody
    collide(&mut game, Player::Two, CollisionSignal::WallCrash);
    assert_eq!(game.scores(), [0, 1]);
    assert_eq!(
        rec.0.borrow().infos.last(),
        Some(&Some("Snail Crash!".to_owned()))
    );

    run_for(&mut game, 2.05);
    assert_eq!(game.round().current_round(), 3);

    // Round 3: Player1 slides into Player2's slime
    let report = collide(&mut game, Player::One, CollisionSignal::OpponentSlime);
    assert!(report.events.iter().any(|e| matches!(
        e,
        GameEvent::Round(Transition::RoundResolved {
            last_round: true,
            ..
        })
    )));
    assert_eq!(game.scores(), [0, 2]);

    let events = run_for(&mut game, 2.05);
    assert!(events.contains(&GameEvent::Round(Transition::MatchDecided(
        MatchOutcome::Winner(Player::Two)
    ))));
    assert!(matches!(game.phase(), MatchPhase::MatchResult { .. }));
    assert_eq!(
        rec.0.borrow().infos.last(),
        Some(&Some("Game over! Player2 won!".to_owned()))
    );
    assert_eq!(game.scores(), [0, 2]);

    run_for(&mut game, 1.0);
    assert!(matches!(game.phase(), MatchPhase::MatchResult { .. }));
    assert_eq!(game.scores(), [0, 2]);

    let events = run_for(&mut game, 1.1);
    assert!(events.contains(&GameEvent::Round(Transition::ReturnedToMenu)));
    assert_eq!(game.phase(), MatchPhase::Menu);
    assert_eq!(game.scores(), [0, 0]);
    assert_eq!(rec.0.borrow().scores.last(), Some(&[0, 0]));
    assert!(game.snail(Player::One).trail().is_empty());
    assert_eq!(rec.0.borrow().collidable.last(), Some(&false));
}

#[test]
fn drawn_match_is_a_tie() {
    let rec = Recorder::default();
    let mut tuning = Tuning::default();
    tuning.rounds.num_rounds = 1;
    let mut game = game_with(tuning, &rec);
    start(&mut game);

    collide(&mut game, Player::One, CollisionSignal::WallCrash);
    let events = run_for(&mut game, 2.05);
    assert!(events.contains(&GameEvent::Round(Transition::MatchDecided(MatchOutcome::Tie))));
    assert_eq!(rec.0.borrow().infos.last(), Some(&Some("Tie!".to_owned())));
}

#[test]
fn own_trail_exit_materializes_territory() {
    let rec = Recorder::default();
    let mut tuning = Tuning::default();
    tuning.trail.point_lifetime = 30.0;
    let color = tuning.players[0].color;
    let mut game = game_with(tuning, &rec);
    start(&mut game);

    let mut guard = 0;
    while game.snail(Player::One).trail().len() < 12 {
        game.tick(&TickInput::default(), SIM_DT);
        guard += 1;
        assert!(guard < 2000, "trail never reached 12 samples");
    }
    let samples = game.snail(Player::One).trail().samples().to_vec();
    assert_eq!(samples.len(), 12);

    let reentry = samples[3].pos + Vec2::new(0.01, 0.0);
    let report = collide(&mut game, Player::One, CollisionSignal::OwnTrailExit(reentry));

    let claimed = report.events.iter().find_map(|e| match e {
        GameEvent::Snail(Player::One, SnailEvent::ShapeReady(region)) => Some(region.clone()),
        _ => None,
    });
    let region = claimed.expect("territory claimed");
    assert_eq!(region.len(), 12 - 3 + 1);
    assert_eq!(region.points[0], samples[3].pos);

    let seen = rec.0.borrow();
    let (owner, materialized, seen_color) = seen.regions.last().expect("materialized");
    assert_eq!(*owner, Player::One);
    assert_eq!(*materialized, region);
    assert_eq!(*seen_color, color);
    // A claim does not end the round
    assert!(matches!(
        game.phase(),
        MatchPhase::RoundActive { motion_at: None }
    ));
}

#[test]
fn short_trail_claim_is_rejected_without_territory() {
    let rec = Recorder::default();
    let mut game = game_with(Tuning::default(), &rec);
    start(&mut game);
    run_for(&mut game, 0.2);
    assert!(game.snail(Player::One).trail().len() < 5);

    let exit_at = game.snail(Player::One).pos();
    let report = collide(&mut game, Player::One, CollisionSignal::OwnTrailExit(exit_at));
    assert!(report.events.iter().any(|e| matches!(
        e,
        GameEvent::Snail(Player::One, SnailEvent::ShapeRejected(_))
    )));
    assert!(rec.0.borrow().regions.is_empty());
}

#[test]
fn new_round_clears_trails_and_territory() {
    let rec = Recorder::default();
    let mut game = game_with(Tuning::default(), &rec);
    let resets_at_menu = rec.0.borrow().territory_resets;
    start(&mut game);
    assert_eq!(rec.0.borrow().territory_resets, resets_at_menu + 1);
    run_for(&mut game, 1.0);
    assert!(!game.snail(Player::One).trail().is_empty());

    collide(&mut game, Player::Two, CollisionSignal::OpponentSlime);
    run_for(&mut game, 2.05);

    assert_eq!(game.round().current_round(), 2);
    assert_eq!(rec.0.borrow().territory_resets, resets_at_menu + 2);
    let start_pos = game.tuning().players[0].start_position;
    // At most a couple of ticks of motion since the reset
    assert!(game.snail(Player::One).pos().distance(start_pos) < 0.1);
}

fn charges_of(rec: &Recorder, player: Player) -> Vec<ChargeLevel> {
    rec.0
        .borrow()
        .charges
        .iter()
        .filter(|(p, _)| *p == player)
        .map(|&(_, level)| level)
        .collect()
}

#[test]
fn gauges_are_sized_from_tuning_at_startup() {
    let rec = Recorder::default();
    let mut tuning = Tuning::default();
    tuning.snail.boost_steps = 6;
    let colors = [tuning.players[0].color, tuning.players[1].color];
    let _game = game_with(tuning, &rec);

    assert_eq!(
        rec.0.borrow().gauges,
        vec![(Player::One, 6, colors[0]), (Player::Two, 6, colors[1])]
    );
}

#[test]
fn boost_gauge_reaches_the_hud_per_player() {
    let rec = Recorder::default();
    let mut game = game_with(Tuning::default(), &rec);
    // Frozen snails report nothing
    assert!(rec.0.borrow().charges.is_empty());
    start(&mut game);

    rec.0.borrow_mut().charges.clear();
    game.tick(&TickInput::default(), SIM_DT);
    assert_eq!(charges_of(&rec, Player::One), vec![ChargeLevel::Level(4)]);
    assert_eq!(charges_of(&rec, Player::Two), vec![ChargeLevel::Level(4)]);

    rec.0.borrow_mut().charges.clear();
    let mut input = TickInput::default();
    input.players[0] = SnailInput {
        turn: 0.0,
        boost: true,
    };
    game.tick(&input, SIM_DT);
    assert_eq!(
        charges_of(&rec, Player::One),
        vec![ChargeLevel::Level(4), ChargeLevel::Drained]
    );
    assert_eq!(charges_of(&rec, Player::Two), vec![ChargeLevel::Level(4)]);
    assert!(game.snail(Player::One).is_boosting());
    assert!(!game.snail(Player::Two).is_boosting());

    // No gauge updates while the boost runs
    rec.0.borrow_mut().charges.clear();
    game.tick(&TickInput::default(), SIM_DT);
    assert!(charges_of(&rec, Player::One).is_empty());
    assert_eq!(charges_of(&rec, Player::Two), vec![ChargeLevel::Level(4)]);
}
