use crate::error::Result;
use crate::filter::Query;
use crate::models::{Application, JobRow, NewJob, User};

/// Storage capabilities the job board needs. `Database` is the SQLite implementation;
/// tests substitute their own.
pub trait RecordStore {
    /// Rows for a page query built by the filter builder.
    fn query(&self, query: &Query) -> Result<Vec<JobRow>>;

    /// Single-value count for a count query built by the filter builder.
    fn count(&self, query: &Query) -> Result<u64>;

    fn get_by_id(&self, id: i64) -> Result<Option<JobRow>>;

    /// Adds one to the stored view counter. Returns false when no row was updated.
    fn increment_view(&self, id: i64) -> Result<bool>;

    /// Inserts a posting and its skills together. Returns the new identifier.
    fn insert_job(&self, poster_id: i64, company_name: &str, job: &NewJob) -> Result<i64>;

    fn get_user(&self, id: i64) -> Result<Option<User>>;

    fn find_application(&self, job_id: i64, user_id: i64) -> Result<Option<Application>>;

    fn insert_application(&self, job_id: i64, user_id: i64) -> Result<i64>;

    fn applications_for_job(&self, job_id: i64) -> Result<Vec<Application>>;
}
