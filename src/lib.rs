//! Greedy ticket bundling for a four-slot evening programme.
//!
//! A [`registry::Registry`] holds the venues and the performers paired with them.
//! [`greedy::Greedy`] repeatedly picks one venue per slot under a rotating tier
//! pattern and books the seats they have in common as a
//! [`model::ticket::TicketBundle`].

pub mod action;
pub mod cli;
pub mod config;
pub mod export;
pub mod greedy;
pub mod loader;
pub mod model;
pub mod registry;
pub mod synth;

pub use action::{AssignError, BookingError, RoundOutcome, StopReason};
pub use greedy::{Assignment, Greedy, Params, MAX_PER_BUNDLE};
pub use registry::Registry;
