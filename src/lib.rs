//! Triple-match tile puzzle engine.
//!
//! Cards sit on a layered board; a card is pickable when nothing on a higher
//! layer shares its grid cell. Picked cards go to a seven-slot bar, and three
//! of a kind clear. Fill the bar without a match and the run is over.
//!
//! The engine is UI-agnostic: every request returns a `Response` carrying
//! the events and a full render `Snapshot`. The terminal front end lives in
//! the `triplestack` binary.

pub mod config;
pub mod domain;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use domain::card::{Card, CardId, Icon};
pub use sim::engine::{Engine, IgnoreReason, Response, Status};
pub use sim::event::GameEvent;
pub use sim::level::Level;
pub use sim::snapshot::{CardView, Outcome, Pending, PendingAction, Snapshot};
