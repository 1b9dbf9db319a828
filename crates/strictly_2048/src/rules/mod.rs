//! Terminal-condition rules.
//!
//! Pure functions over a `Board`, kept apart from board storage so the
//! state machine and contracts can compose them.

pub mod game_over;
pub mod win;

pub use game_over::{can_move, has_adjacent_pair};
pub use win::reached_win;
