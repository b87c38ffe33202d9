//! Database models shared across the shelter repository.

pub mod client;
pub mod config;
pub mod foster;
pub mod pet;
pub mod user;
