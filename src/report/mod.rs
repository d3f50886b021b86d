//! Report renderers for extracted dependency graphs.
//!
//! - [`terminal`] — colored summary box and dependency tables; respects `--verbose` / `--quiet`.
//! - [`json`] — machine-readable graph on stdout.

pub mod json;
pub mod terminal;
