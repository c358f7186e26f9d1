use super::domain::{CompOffId, CompOffLog, CompensatoryOff};
use crate::workflows::directory::EmployeeId;
use crate::workflows::repository::RepositoryError;

pub trait CompOffRepository: Send + Sync {
    fn insert_comp_off(&self, entry: CompensatoryOff) -> Result<CompensatoryOff, RepositoryError>;
    fn update_comp_off(&self, entry: CompensatoryOff) -> Result<(), RepositoryError>;
    fn fetch_comp_off(&self, id: &CompOffId) -> Result<Option<CompensatoryOff>, RepositoryError>;
    fn comp_offs_for(&self, employee: &EmployeeId)
        -> Result<Vec<CompensatoryOff>, RepositoryError>;
    fn all_comp_offs(&self) -> Result<Vec<CompensatoryOff>, RepositoryError>;

    fn append_comp_off_log(&self, entry: CompOffLog) -> Result<(), RepositoryError>;
    fn comp_off_logs(&self, id: &CompOffId) -> Result<Vec<CompOffLog>, RepositoryError>;
}
