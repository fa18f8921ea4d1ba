//! Step-wizard controller

pub mod controller;
pub mod events;

pub use controller::WizardController;
pub use events::{RenderEvent, RenderHandler, RunSnapshot, StepSnapshot};
