//! Compensatory off credits earned for working on off days.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{
    available_balance, CompOffAction, CompOffError, CompOffId, CompOffLog, CompOffStatus,
    CompensatoryOff,
};
pub use repository::CompOffRepository;
pub use service::{CompOffService, CompOffServiceError};
