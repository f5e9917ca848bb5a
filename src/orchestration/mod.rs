//! End-to-end linking of a query list against a candidate list.
//!
//! - [`window`]: splits dated rows into per-month windows and runs the
//!   matcher over each of them
//! - [`output`]: writes linked queries as long or wide CSV, or JSON
//!
//! When both lists carry dates, queries are grouped by calendar month and each
//! month only sees candidates dated within the [`MatchingHorizon`] around it
//! (by default eight months before to three months after).

pub mod output;
pub mod window;

pub use output::{OutputError, OutputLayout};
pub use window::{Linker, LinkedMatch, LinkedQuery, MatchingHorizon, YearMonth};
