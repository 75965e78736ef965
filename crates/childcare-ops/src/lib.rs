//! Core library for the municipal childcare operations service: configuration,
//! telemetry, and the workflow tree (income review scheduling plus the archival
//! and staffing integration boundaries).

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
