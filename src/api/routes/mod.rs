//! API route modules

pub mod broadcast;
pub mod client;
pub mod health;
pub mod orders;
pub mod products;
pub mod stats;
