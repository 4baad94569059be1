//! Session logic: level generation, undo history, and the request/response engine.

pub mod engine;
pub mod event;
pub mod history;
pub mod level;
pub mod rng;
pub mod snapshot;
pub mod world;
