use anyhow::{Context, anyhow};
use rusqlite::{Connection, params, params_from_iter};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{BoardError, Result};
use crate::filter::{JOB_COLUMNS, JOB_SOURCE, Query};
use crate::models::{
    Application, ApplicationStatus, DEFAULT_CURRENCY, JobRow, NewJob, Role, User,
};
use crate::store::RecordStore;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL DEFAULT 'job_seeker' CHECK (role IN ('job_seeker', 'employer')),
                company TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                company_name TEXT NOT NULL,
                location TEXT NOT NULL,
                salary_min INTEGER,
                salary_max INTEGER,
                salary_currency TEXT DEFAULT 'USD',
                job_type TEXT NOT NULL CHECK (job_type IN ('Full-time', 'Part-time', 'Contract', 'Temporary', 'Internship', 'Remote')),
                category TEXT NOT NULL CHECK (category IN ('Technology', 'Design', 'Data', 'Product', 'Sales', 'Marketing', 'HR', 'Finance')),
                experience_level TEXT NOT NULL CHECK (experience_level IN ('Entry', 'Junior', 'Mid-level', 'Senior', 'Lead', 'Executive')),
                qualifications TEXT,
                views INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS job_skills (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
                skill TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                status TEXT NOT NULL DEFAULT 'applied' CHECK (status IN ('applied', 'reviewed', 'shortlisted', 'rejected')),
                applied_at TEXT NOT NULL,
                UNIQUE (job_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_created ON jobs(created_at);
            CREATE INDEX IF NOT EXISTS idx_jobs_category ON jobs(category);
            CREATE INDEX IF NOT EXISTS idx_jobs_type ON jobs(job_type);
            CREATE INDEX IF NOT EXISTS idx_jobs_level ON jobs(experience_level);
            CREATE INDEX IF NOT EXISTS idx_skills_job ON job_skills(job_id);
            CREATE INDEX IF NOT EXISTS idx_applications_job ON applications(job_id);
            "#,
        )?;
        info!("job board schema ready");
        Ok(())
    }

    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='jobs'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(anyhow!(
                "Database not initialized. Run 'jobboard init' first."
            ));
        }
        Ok(())
    }

    // --- User operations ---

    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        role: Role,
        company: Option<&str>,
    ) -> Result<i64> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(BoardError::InvalidInput("name is required".to_string()));
        }
        if !email.contains('@') {
            return Err(BoardError::InvalidInput(format!(
                "'{}' is not a valid email",
                email
            )));
        }
        let company = company.map(str::trim).filter(|c| !c.is_empty());

        let now = now();
        self.conn.execute(
            "INSERT INTO users (name, email, role, company, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![name, email, role, company, now],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(user_id = id, role = %role, "registered user");
        Ok(id)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, role, company, created_at FROM users ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::row_to_user)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            company: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    // --- Job rows ---

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<JobRow> {
        Ok(JobRow {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            company_name: row.get(4)?,
            location: row.get(5)?,
            salary_min: row.get(6)?,
            salary_max: row.get(7)?,
            salary_currency: row.get(8)?,
            job_type: row.get(9)?,
            category: row.get(10)?,
            experience_level: row.get(11)?,
            qualifications: row.get(12)?,
            views: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
            skills: row.get(16)?,
        })
    }

    fn row_to_application(row: &rusqlite::Row) -> rusqlite::Result<Application> {
        Ok(Application {
            id: row.get(0)?,
            job_id: row.get(1)?,
            user_id: row.get(2)?,
            status: row.get(3)?,
            applied_at: row.get(4)?,
        })
    }
}

impl RecordStore for Database {
    fn query(&self, query: &Query) -> Result<Vec<JobRow>> {
        let mut stmt = self.conn.prepare(&query.sql)?;
        let rows = stmt.query_map(params_from_iter(query.params.iter()), Self::row_to_job)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn count(&self, query: &Query) -> Result<u64> {
        let total: i64 = self.conn.query_row(
            &query.sql,
            params_from_iter(query.params.iter()),
            |row| row.get(0),
        )?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    fn get_by_id(&self, id: i64) -> Result<Option<JobRow>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE j.id = ?1 GROUP BY j.id",
            JOB_COLUMNS, JOB_SOURCE
        );
        match self.conn.query_row(&sql, [id], Self::row_to_job) {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn increment_view(&self, id: i64) -> Result<bool> {
        let updated = self
            .conn
            .execute("UPDATE jobs SET views = views + 1 WHERE id = ?1", [id])?;
        debug!(job_id = id, updated, "incremented view counter");
        Ok(updated > 0)
    }

    fn insert_job(&self, poster_id: i64, company_name: &str, job: &NewJob) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let now = now();
        tx.execute(
            "INSERT INTO jobs (user_id, title, description, company_name, location,
                               salary_min, salary_max, salary_currency, job_type, category,
                               experience_level, qualifications, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
            params![
                poster_id,
                job.title,
                job.description,
                company_name,
                job.location,
                job.salary_min,
                job.salary_max,
                job.salary_currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
                job.job_type,
                job.category,
                job.experience_level,
                job.qualifications,
                now,
            ],
        )?;
        let job_id = tx.last_insert_rowid();

        {
            let mut insert_skill =
                tx.prepare("INSERT INTO job_skills (job_id, skill) VALUES (?1, ?2)")?;
            for skill in &job.skills {
                insert_skill.execute(params![job_id, skill])?;
            }
        }

        tx.commit()?;
        Ok(job_id)
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, name, email, role, company, created_at FROM users WHERE id = ?1",
            [id],
            Self::row_to_user,
        );
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn find_application(&self, job_id: i64, user_id: i64) -> Result<Option<Application>> {
        let result = self.conn.query_row(
            "SELECT id, job_id, user_id, status, applied_at
             FROM applications WHERE job_id = ?1 AND user_id = ?2",
            [job_id, user_id],
            Self::row_to_application,
        );
        match result {
            Ok(app) => Ok(Some(app)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_application(&self, job_id: i64, user_id: i64) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO applications (job_id, user_id, status, applied_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![job_id, user_id, ApplicationStatus::Applied, now()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn applications_for_job(&self, job_id: i64) -> Result<Vec<Application>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, job_id, user_id, status, applied_at
             FROM applications WHERE job_id = ?1 ORDER BY applied_at, id",
        )?;
        let rows = stmt.query_map([job_id], Self::row_to_application)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// UTC timestamp with millisecond precision; sorts lexically.
fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCriteria, Predicate};
    use crate::models::{Category, ExperienceLevel, JobType};
    use crate::pagination::PageRequest;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    fn new_job(title: &str, skills: &[&str]) -> NewJob {
        NewJob {
            title: title.to_string(),
            description: "Build things".to_string(),
            location: "Remote".to_string(),
            salary_min: Some(100),
            salary_max: None,
            salary_currency: None,
            job_type: JobType::Contract,
            category: Category::Technology,
            experience_level: ExperienceLevel::Lead,
            qualifications: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        let db = setup();
        db.init().unwrap();
        db.ensure_initialized().unwrap();
    }

    #[test]
    fn test_uninitialized_database_is_reported() {
        let db = Database::open_in_memory().unwrap();
        let err = db.ensure_initialized().unwrap_err();
        assert!(err.to_string().contains("jobboard init"));
    }

    #[test]
    fn test_create_user_validates() {
        let db = setup();
        assert!(matches!(
            db.create_user(" ", "a@b.c", Role::Employer, None),
            Err(BoardError::InvalidInput(_))
        ));
        assert!(matches!(
            db.create_user("Ann", "nope", Role::Employer, None),
            Err(BoardError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_duplicate_email_is_a_store_error() {
        let db = setup();
        db.create_user("Ann", "ann@example.com", Role::JobSeeker, None)
            .unwrap();
        let err = db
            .create_user("Ann Again", "ann@example.com", Role::JobSeeker, None)
            .unwrap_err();
        assert!(matches!(err, BoardError::Store(_)));
    }

    #[test]
    fn test_user_round_trip() {
        let db = setup();
        let id = db
            .create_user("Tech Company", "employer@example.com", Role::Employer, Some("TechCorp Inc"))
            .unwrap();
        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.role, Role::Employer);
        assert_eq!(user.company.as_deref(), Some("TechCorp Inc"));
        assert!(db.get_user(id + 1).unwrap().is_none());
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_insert_job_stores_skills_in_order() {
        let db = setup();
        let poster = db
            .create_user("Poster", "p@example.com", Role::Employer, None)
            .unwrap();
        let id = db
            .insert_job(poster, "Acme", &new_job("Rust Engineer", &["Rust", "SQL, Postgres"]))
            .unwrap();

        let row = db.get_by_id(id).unwrap().unwrap();
        assert_eq!(row.company_name, "Acme");
        assert_eq!(row.salary_currency.as_deref(), Some("USD"));
        assert_eq!(row.views, 0);
        assert_eq!(row.skills.as_deref(), Some("Rust\u{1f}SQL, Postgres"));
    }

    #[test]
    fn test_job_without_skills_aggregates_to_null() {
        let db = setup();
        let poster = db
            .create_user("Poster", "p@example.com", Role::Employer, None)
            .unwrap();
        let id = db.insert_job(poster, "Acme", &new_job("Solo", &[])).unwrap();
        assert_eq!(db.get_by_id(id).unwrap().unwrap().skills, None);
    }

    #[test]
    fn test_increment_view_reports_missing_rows() {
        let db = setup();
        let poster = db
            .create_user("Poster", "p@example.com", Role::Employer, None)
            .unwrap();
        let id = db.insert_job(poster, "Acme", &new_job("Viewed", &[])).unwrap();

        assert!(db.increment_view(id).unwrap());
        assert!(db.increment_view(id).unwrap());
        assert_eq!(db.get_by_id(id).unwrap().unwrap().views, 2);
        assert!(!db.increment_view(id + 100).unwrap());
    }

    #[test]
    fn test_unknown_poster_violates_foreign_key() {
        let db = setup();
        let err = db.insert_job(42, "Ghost", &new_job("Orphan", &["x"])).unwrap_err();
        assert!(matches!(err, BoardError::Store(_)));
        let total = db
            .count(&Predicate::from_criteria(&FilterCriteria::default()).count_query())
            .unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_page_and_count_queries_execute() {
        let db = setup();
        let poster = db
            .create_user("Poster", "p@example.com", Role::Employer, None)
            .unwrap();
        for i in 0..3 {
            db.insert_job(poster, "Acme", &new_job(&format!("Job {}", i), &["A", "B"]))
                .unwrap();
        }

        let predicate = Predicate::from_criteria(&FilterCriteria::default());
        let rows = db
            .query(&predicate.page_query(&PageRequest::new(Some(1), Some(2))))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Job 2");
        assert_eq!(rows[0].skills.as_deref(), Some("A\u{1f}B"));
        assert_eq!(db.count(&predicate.count_query()).unwrap(), 3);
    }

    #[test]
    fn test_duplicate_application_violates_unique_constraint() {
        let db = setup();
        let poster = db
            .create_user("Poster", "p@example.com", Role::Employer, None)
            .unwrap();
        let seeker = db
            .create_user("Seeker", "s@example.com", Role::JobSeeker, None)
            .unwrap();
        let job = db.insert_job(poster, "Acme", &new_job("Job", &[])).unwrap();

        db.insert_application(job, seeker).unwrap();
        assert!(matches!(
            db.insert_application(job, seeker),
            Err(BoardError::Store(_))
        ));
        let apps = db.applications_for_job(job).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].status, ApplicationStatus::Applied);
        assert!(db.find_application(job, seeker).unwrap().is_some());
    }
}
