//! Terminal rendering using ratatui.
//!
//! The dashboard is a fixed layout: header bar, a horizontal split with
//! the event log on the left and the latest readings on the right, and a
//! status bar. The help overlay is a centered modal.

pub mod common;
pub mod log;
pub mod theme;
pub mod values;

pub use theme::Theme;
