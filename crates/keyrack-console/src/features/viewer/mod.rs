//! Masked key detail viewer.
//!
//! # Design
//! - Only the masked view is ever requested.
//! - Closing the viewer drops every fetched record and invalidates in-flight
//!   responses.

pub mod logic;
pub mod state;
