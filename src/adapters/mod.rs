// Adapters layer: concrete implementations of the ports for external systems.

pub mod cloudfront;
pub mod platform;
pub mod terminal;
