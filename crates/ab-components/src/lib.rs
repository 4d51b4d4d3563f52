//! # ab-components
//!
//! Leptos UI components for the A/B conversion dashboard.

pub mod controls;
pub mod dashboard;

pub use controls::*;
pub use dashboard::*;
