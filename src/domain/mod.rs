// Domain layer: row model and the ports the gateway depends on.

pub mod model;
pub mod ports;
