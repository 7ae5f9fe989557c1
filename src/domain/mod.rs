// Domain layer: value types and ports. No storage or CLI concerns here.

pub mod model;
pub mod participant;
pub mod ports;
