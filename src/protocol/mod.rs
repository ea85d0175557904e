//! Gateway wire models.

pub mod models;
