// Common library for the timer migration analyzer

pub mod classify;
pub mod config;
pub mod engine;
pub mod errors;
pub mod escape;
pub mod intake;
pub mod models;
pub mod report;
pub mod sink;
pub mod telemetry;
pub mod translate;
