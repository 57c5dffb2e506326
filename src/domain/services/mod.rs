//! Pure domain services.

pub mod renumbering;
