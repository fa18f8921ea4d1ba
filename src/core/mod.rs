//! Core domain models
//!
//! This module defines pipelines, steps, the per-run state machine and the
//! configuration they are loaded from.

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod settings;
pub mod state;
pub mod step;

pub use context::*;
pub use error::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
