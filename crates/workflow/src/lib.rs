//! `docflow-workflow` — generic document state machine.
//!
//! Every document variant shares one transition validator parameterized by a
//! per-type table of `(from, action, to)` edges. A pair not present in the
//! table is rejected before any side effect runs, which is what reduces
//! whole-pipeline idempotency to this single check.

pub mod machine;

pub use machine::TransitionTable;
