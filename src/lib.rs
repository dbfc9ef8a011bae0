//! Lead intake — a scripted chat assistant that qualifies furniture leads
//! and routes them to the right store unit.

pub mod agent;
pub mod channels;
pub mod config;
pub mod error;
pub mod intake;
pub mod leads;
pub mod routes;
pub mod settings;
pub mod store;
