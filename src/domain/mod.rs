//! Domain layer: renewal orders, charge values, remediation steps and the
//! ports the application layer drives.

pub mod charge;
pub mod order;
pub mod ports;
pub mod remediation;
