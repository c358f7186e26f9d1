use chrono::NaiveDate;

use super::domain::{Tour, TourId, TourStatusLog};
use crate::workflows::directory::EmployeeId;
use crate::workflows::repository::RepositoryError;

/// Storage for tours and their status logs.
pub trait TourRepository: Send + Sync {
    fn insert_tour(&self, tour: Tour) -> Result<Tour, RepositoryError>;
    fn update_tour(&self, tour: Tour) -> Result<(), RepositoryError>;
    fn fetch_tour(&self, id: &TourId) -> Result<Option<Tour>, RepositoryError>;
    fn tours_for(&self, employee: &EmployeeId) -> Result<Vec<Tour>, RepositoryError>;
    fn all_tours(&self) -> Result<Vec<Tour>, RepositoryError>;
    /// Tours whose planned or extended window touches `from..=to`.
    fn tours_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Tour>, RepositoryError>;
    fn tour_slug_exists(&self, slug: &str) -> Result<bool, RepositoryError>;

    fn append_tour_log(&self, entry: TourStatusLog) -> Result<(), RepositoryError>;
    fn tour_logs(&self, id: &TourId) -> Result<Vec<TourStatusLog>, RepositoryError>;
}
