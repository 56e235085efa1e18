//! Application layer orchestrating renewal charges.
//!
//! `RenewalEngine` drives the remediate-and-retry cycle for one due renewal;
//! `ScheduledPaymentDispatcher` routes scheduled renewal events to the engine
//! registered for a gateway id and keeps duplicate events from reaching it.

pub mod dispatcher;
pub mod engine;
