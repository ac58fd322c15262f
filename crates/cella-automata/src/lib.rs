//! Generic 2D cellular automata with declarative rules.
//!
//! Cells hold one of `N` discrete states. Each generation, every cell looks
//! at its 3x3 neighbourhood and takes the target state of the first rule
//! whose condition holds, or keeps its state if none does. Conditions are
//! small boolean expressions over the raw window (`n00`..`n22`) and the
//! per-state neighbour counts (`s0`..`s{N-1}`).
//!
//! - [`Grid`] - padded cell storage with a caller-controlled border ring
//! - [`Rule`] - a compiled condition plus a target state
//! - [`Automaton`] - current/next grids, ordered rules, generation counter
//! - [`presets`] - Game of Life and other common rule sets
//!
//! # Example
//!
//! ```
//! use cella_automata::{Automaton, Rule};
//!
//! let mut ca = Automaton::new(5, 5, 2).unwrap();
//! ca.set_rules(vec![
//!     Rule::new("n11 == 1 && (s1 == 2 || s1 == 3)", 1, 2),
//!     Rule::new("n11 == 0 && s1 == 3", 1, 2),
//!     Rule::new("true", 0, 2),
//! ])
//! .unwrap();
//!
//! // 2x2 block: a still life.
//! for (x, y) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
//!     ca.current_grid_mut().set(x, y, 1);
//! }
//! ca.set_borders_toroidal();
//! ca.step().unwrap();
//! ca.swap_grids();
//! assert_eq!(ca.count_cells_per_state(), &[21, 4]);
//! ```

mod automaton;
mod config;
mod error;
mod grid;
pub mod presets;
mod rule;

pub use automaton::Automaton;
pub use config::{AutomatonConfig, Boundary, RuleConfig};
pub use error::AutomatonError;
pub use grid::{Edge, Grid, Neighbourhood};
pub use rule::{NEIGHBOUR_SLOTS, NeighbourhoodScope, Rule};

pub use cella_expr;

/// A cell state, in `[0, num_states)`.
pub type Cell = u8;

/// Largest state count a [`Cell`] can represent.
pub const MAX_STATES: usize = Cell::MAX as usize + 1;
