//! Loaders for the two name lists.
//!
//! Both lists are CSV files with a header row. Each row carries a raw name in
//! `"REGISTRANT : FUND"` form, an identifier, and optionally a date used to
//! group rows into matching windows:
//!
//! | Column | Queries  | Candidates | Default header |
//! |--------|----------|------------|----------------|
//! | name   | Yes      | Yes        | `name`         |
//! | id     | Optional | Yes        | `id`           |
//! | date   | Optional | Optional   | (none)         |
//!
//! Dates are accepted as `YYYYMMDD` or `YYYY-MM-DD`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fund_linker::parsing::records::{load_candidates, ColumnSpec};
//! use std::path::Path;
//!
//! let candidates = load_candidates(Path::new("filings.csv"), &ColumnSpec::default()).unwrap();
//! println!("{} candidates", candidates.len());
//! ```

pub mod records;
