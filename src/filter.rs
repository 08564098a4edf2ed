use rusqlite::types::Value;
use tracing::debug;

use crate::models::{Category, ExperienceLevel, JobType};
use crate::pagination::PageRequest;

/// Columns selected for a posting, in the order `Database::row_to_job` reads them.
pub const JOB_COLUMNS: &str = "j.id, j.user_id, j.title, j.description, j.company_name, j.location,
       j.salary_min, j.salary_max, j.salary_currency, j.job_type, j.category,
       j.experience_level, j.qualifications, j.views, j.created_at, j.updated_at,
       GROUP_CONCAT(js.skill, char(31) ORDER BY js.id) AS skills";

/// Postings joined with their skill rows; pair with `GROUP BY j.id`.
pub const JOB_SOURCE: &str = "jobs j LEFT JOIN job_skills js ON js.job_id = j.id";

/// Separator produced by the skill aggregation (ASCII unit separator).
pub const SKILL_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub location: Option<String>,
    pub page: PageRequest,
}

/// One predicate condition and the values bound to its `?` placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Clause {
    fn equals(column: &str, value: &str) -> Self {
        Self {
            sql: format!("{} = ?", column),
            params: vec![Value::Text(value.to_string())],
        }
    }

    fn contains(columns: &[&str], needle: &str) -> Self {
        let pattern = format!("%{}%", escape_like(needle));
        let sql = columns
            .iter()
            .map(|c| format!("{} LIKE ? ESCAPE '\\'", c))
            .collect::<Vec<_>>()
            .join(" OR ");
        Self {
            sql: if columns.len() > 1 { format!("({})", sql) } else { sql },
            params: vec![Value::Text(pattern); columns.len()],
        }
    }
}

/// A parameterized SQL statement ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Conjunction of clauses shared by the page and count queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let mut clauses = Vec::new();

        if let Some(term) = non_blank(&criteria.search) {
            clauses.push(Clause::contains(
                &["j.title", "j.description", "j.company_name"],
                term,
            ));
        }
        if let Some(category) = criteria.category {
            clauses.push(Clause::equals("j.category", category.as_str()));
        }
        if let Some(job_type) = criteria.job_type {
            clauses.push(Clause::equals("j.job_type", job_type.as_str()));
        }
        if let Some(level) = criteria.experience_level {
            clauses.push(Clause::equals("j.experience_level", level.as_str()));
        }
        if let Some(location) = non_blank(&criteria.location) {
            clauses.push(Clause::contains(&["j.location"], location));
        }

        debug!(clauses = clauses.len(), "built job predicate");
        Self { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        let joined = self
            .clauses
            .iter()
            .map(|c| c.sql.as_str())
            .collect::<Vec<_>>()
            .join(" AND ");
        format!(" WHERE {}", joined)
    }

    fn params(&self) -> Vec<Value> {
        self.clauses
            .iter()
            .flat_map(|c| c.params.iter().cloned())
            .collect()
    }

    /// Newest postings first, one row per posting, limited to the requested window.
    pub fn page_query(&self, window: &PageRequest) -> Query {
        let sql = format!(
            "SELECT {} FROM {}{} GROUP BY j.id ORDER BY j.created_at DESC, j.id DESC LIMIT ? OFFSET ?",
            JOB_COLUMNS,
            JOB_SOURCE,
            self.where_sql()
        );
        let mut params = self.params();
        params.push(Value::Integer(i64::from(window.limit())));
        params.push(Value::Integer(
            i64::try_from(window.offset()).unwrap_or(i64::MAX),
        ));
        Query { sql, params }
    }

    /// Number of postings matching the predicate, ignoring the window.
    pub fn count_query(&self) -> Query {
        Query {
            sql: format!("SELECT COUNT(*) FROM jobs j{}", self.where_sql()),
            params: self.params(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Makes `%`, `_` and `\` literal inside a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
