//! oncodemo: a cancer detection showcase.
//!
//! Dataset selection, form validation, a simulated decision-tree training
//! pipeline with an optional remote endpoint, and chart data for the results.
//!
//! Layers, innermost first: [`domain`], [`application`], [`infrastructure`], [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
