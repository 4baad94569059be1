//! Terminal front end: key and mouse input, diff renderer, optional sound.

pub mod input;
pub mod renderer;
pub mod sound;
