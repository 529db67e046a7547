//! Operation orchestration.
//!
//! Owns the status gate, the read model, and the command loop. UI and headless layers
//! call into this module and only observe state through `watch` receivers.

mod classify;
#[cfg(any(feature = "tui", test))]
mod controller;
mod coordinator;
#[cfg(test)]
pub(crate) mod fake;
mod operations;
mod reads;
mod runner;

#[cfg(feature = "tui")]
pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use operations::{Operation, Panel};
#[cfg(feature = "tui")]
pub(crate) use reads::ReadViews;
