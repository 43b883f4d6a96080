//! # se-sweep
//!
//! Turns parameter grids into the list of jobs one host should submit.
//!
//! The pipeline is `expand` (cartesian product per grid, concatenated),
//! then a seeded `Shuffler`, then `route` to pick this host's contiguous
//! slice of the shuffled list. Every host runs the same pipeline with the
//! same seed, so they agree on the global order without talking to each
//! other.

mod grid;
mod route;
mod shuffle;

pub use grid::{expand, expand_grid};
pub use route::{route, route_weighted, RouteBounds};
pub use shuffle::{shuffled, Shuffler, DEFAULT_SHUFFLE_SEED};
