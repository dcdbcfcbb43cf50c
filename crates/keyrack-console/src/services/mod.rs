//! Backend access for the console.

pub mod api;
