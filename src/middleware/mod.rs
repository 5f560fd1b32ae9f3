// Middleware for the relay

pub mod cors;

pub use cors::*;
