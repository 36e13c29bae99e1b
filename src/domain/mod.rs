// Domain layer: models and ports (interfaces) the core works against.

pub mod model;
pub mod ports;
