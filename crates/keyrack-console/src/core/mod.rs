//! Primitives shared by the feature slices.

pub mod notice;
pub mod ticket;
