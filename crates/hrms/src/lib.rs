//! Leave, attendance, tour and compensatory-off workflows for the HR management service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
