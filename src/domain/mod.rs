// Domain layer: order/email models and the ports the host platform implements.

pub mod model;
pub mod ports;
