//! Goods and their stock rule. Pure logic; persisting the new stock level is
//! the caller's job.

pub mod good;

pub use good::{Good, InsufficientStock};
