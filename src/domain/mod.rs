// Domain layer: frames and ports (interfaces). No external dependencies beyond chrono/serde.

pub mod model;
pub mod ports;
