//! Official tours: request, approval, extension and per-day presence segments.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApprovalType, Tour, TourAction, TourId, TourRequest, TourSegment, TourStatus, TourStatusLog,
    TourValidationError,
};
pub use repository::TourRepository;
pub use router::tour_router;
pub use service::{TourService, TourServiceError};
