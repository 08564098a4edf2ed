//! Listing, viewing, posting and applying: the operations callers invoke.
//!
//! The store is injected so every operation runs against whatever `RecordStore` the
//! caller hands in. Listing issues two independent round trips (page, then count), so under
//! concurrent writes the reported total can disagree with the returned page.

use tracing::{debug, info};

use crate::error::{BoardError, Result};
use crate::filter::{FilterCriteria, Predicate};
use crate::models::{Application, JobPosting, NewJob, Role};
use crate::pagination::{PageRequest, PageResult};
use crate::projection::project;
use crate::store::RecordStore;

pub struct JobBoard<S> {
    store: S,
}

impl<S: RecordStore> JobBoard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One page of postings matching `criteria`, newest first, with pagination metadata.
    pub fn list_jobs(&self, criteria: &FilterCriteria) -> Result<PageResult> {
        let predicate = Predicate::from_criteria(criteria);
        let window = criteria.page;
        debug!(
            filtered = !predicate.is_empty(),
            page = window.page(),
            limit = window.limit(),
            offset = window.offset(),
            "listing jobs"
        );

        let rows = self.store.query(&predicate.page_query(&window))?;
        let total = self.store.count(&predicate.count_query())?;

        Ok(PageResult {
            data: rows.into_iter().map(project).collect(),
            pagination: window.describe(total),
        })
    }

    /// Every posting, newest first.
    pub fn all_jobs(&self) -> Result<Vec<JobPosting>> {
        let criteria = FilterCriteria {
            page: PageRequest::unbounded(),
            ..Default::default()
        };
        Ok(self.list_jobs(&criteria)?.data)
    }

    /// Fetches a posting and counts the view.
    ///
    /// Existence is confirmed before the counter is touched. The returned view count is the
    /// value read plus one, computed here rather than re-read, so concurrent viewers may
    /// see the same number (last write wins on the counter).
    pub fn get_job(&self, id: i64) -> Result<JobPosting> {
        let mut row = self
            .store
            .get_by_id(id)?
            .ok_or_else(|| BoardError::job_not_found(id))?;

        if !self.store.increment_view(id)? {
            return Err(BoardError::job_not_found(id));
        }
        row.views += 1;

        Ok(project(row))
    }

    pub fn post_job(&self, poster_id: i64, job: NewJob) -> Result<i64> {
        let poster = self
            .store
            .get_user(poster_id)?
            .ok_or_else(|| BoardError::user_not_found(poster_id))?;
        if poster.role != Role::Employer {
            return Err(BoardError::NotAuthorized(format!(
                "only employers can post jobs (user #{} is a {})",
                poster.id, poster.role
            )));
        }

        let job = normalize(job)?;
        let company_name = poster
            .company
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(poster.name.as_str());

        let id = self.store.insert_job(poster.id, company_name, &job)?;
        info!(
            job_id = id,
            poster_id = poster.id,
            skills = job.skills.len(),
            "posted job"
        );
        Ok(id)
    }

    pub fn apply(&self, job_id: i64, user_id: i64) -> Result<i64> {
        if self.store.get_by_id(job_id)?.is_none() {
            return Err(BoardError::job_not_found(job_id));
        }
        let applicant = self
            .store
            .get_user(user_id)?
            .ok_or_else(|| BoardError::user_not_found(user_id))?;
        if applicant.role != Role::JobSeeker {
            return Err(BoardError::NotAuthorized(format!(
                "only job seekers can apply (user #{} is a {})",
                applicant.id, applicant.role
            )));
        }
        if self.store.find_application(job_id, user_id)?.is_some() {
            return Err(BoardError::AlreadyApplied { job_id, user_id });
        }

        let id = self.store.insert_application(job_id, user_id)?;
        info!(application_id = id, job_id, user_id, "application submitted");
        Ok(id)
    }

    pub fn applications(&self, job_id: i64) -> Result<Vec<Application>> {
        if self.store.get_by_id(job_id)?.is_none() {
            return Err(BoardError::job_not_found(job_id));
        }
        self.store.applications_for_job(job_id)
    }
}

fn required(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn normalize(job: NewJob) -> Result<NewJob> {
    if let (Some(min), Some(max)) = (job.salary_min, job.salary_max) {
        if min > max {
            return Err(BoardError::InvalidInput(format!(
                "salary minimum {} exceeds maximum {}",
                min, max
            )));
        }
    }

    Ok(NewJob {
        title: required("title", job.title)?,
        description: required("description", job.description)?,
        location: required("location", job.location)?,
        salary_currency: job
            .salary_currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty()),
        qualifications: job
            .qualifications
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
        skills: job
            .skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        ..job
    })
}
