//! Domain aggregates exposed by the shelter service layer.

pub mod client;
pub mod foster;
pub mod foster_interval;
pub mod pet;
pub mod sort;
pub mod types;
pub mod user;
