//! Console feature slices.

pub mod status;
pub mod toggle;
pub mod viewer;
