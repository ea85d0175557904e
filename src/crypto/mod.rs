//! Callback checksum primitives.

pub mod canonical;
pub mod pipeline;
pub mod verify;
