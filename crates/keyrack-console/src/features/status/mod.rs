//! Key health indicator.
//!
//! # Design
//! - Classification is a pure function of the summary and the policy.
//! - A failed fetch is its own state instead of looking like "no keys".
//! - The indicator fetches the count view only; it never sees timestamps.

pub mod logic;
pub mod state;
