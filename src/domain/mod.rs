//! Pure puzzle rules: cards, board, occlusion and the matching bar.
//! Nothing here knows about levels, history or presentation.

pub mod bar;
pub mod board;
pub mod card;
pub mod occlusion;
