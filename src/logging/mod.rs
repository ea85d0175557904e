//! Outcome logging for gateway responses.

pub mod outcome;

pub use outcome::{OutcomeLevel, OutcomeLogger};
