//! Component C5: the invalidation engine.
//!
//! Three independent stages (§4.5), kept as separate functions rather than
//! one monolithic entry point so a driver can interleave compiler calls
//! between them: [`compute_initial_invalidation`] (stage 1, pure data), a
//! compile step the driver runs itself, then [`closure`] (stage 3) seeded
//! from the per-class diffs the driver produced with `incra-diff`, and
//! finally [`resolve_invalidation`] (the fraction gate).

mod closure;
mod gate;
mod initial;

pub use closure::{closure, ClosureOutcome, ClosureResult};
pub use gate::{fraction_gate, invalid_sources, resolve_invalidation, Invalidation};
pub use initial::{compute_initial_invalidation, InitialInvalidation};
