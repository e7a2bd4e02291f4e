//! Fixed-step simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only, time passed in explicitly
//! - Seeded RNG only
//! - No rendering, physics or platform dependencies (those are sinks)

pub mod curve;
pub mod round;
pub mod shape;
pub mod snail;
pub mod tick;
pub mod trail;

pub use curve::{BoostCurve, Key};
pub use round::{MatchOutcome, MatchPhase, RoundMachine, Transition};
pub use shape::{TerritoryRegion, extract_shape};
pub use snail::{
    BoostState, ChargeLevel, CollisionSignal, CrashKind, Pose, Snail, SnailEvent, SnailInput,
    SnailUpdate,
};
pub use tick::{Game, GameEvent, GameSinks, SnailSinks, TickInput, TickReport};
pub use trail::{Sample, Trail};
