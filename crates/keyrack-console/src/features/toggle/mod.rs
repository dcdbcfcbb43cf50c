//! Polling/random mode switch.
//!
//! # Design
//! - `Idle -> Pending -> Idle`; a second toggle while pending is rejected.
//! - Local mode changes only after the server confirms the switch.
//! - Single-key channels render a fixed label and never issue requests.

pub mod logic;
pub mod state;
