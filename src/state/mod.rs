//! State module for the AMV lifecycle
//!
//! `AmvState` is the four-stage lifecycle every tracked AMV moves through:
//! discovered, ready, dispatched, collected.

mod amv_state;

pub use amv_state::AmvState;
