use crate::filter::SKILL_SEPARATOR;
use crate::models::{DEFAULT_CURRENCY, JobPosting, JobRow, Salary};

/// Reshapes a stored row into its public representation.
pub fn project(row: JobRow) -> JobPosting {
    JobPosting {
        id: row.id,
        title: row.title,
        description: row.description,
        company_name: row.company_name,
        location: row.location,
        salary: Salary {
            min: row.salary_min,
            max: row.salary_max,
            currency: row
                .salary_currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        },
        job_type: row.job_type,
        category: row.category,
        experience_level: row.experience_level,
        skills: split_skills(row.skills.as_deref()),
        qualifications: row.qualifications,
        views: row.views,
        posted_by: row.user_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub fn split_skills(aggregated: Option<&str>) -> Vec<String> {
    match aggregated {
        Some(s) if !s.is_empty() => s.split(SKILL_SEPARATOR).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ExperienceLevel, JobType};

    fn row(skills: Option<&str>) -> JobRow {
        JobRow {
            id: 4,
            user_id: 2,
            title: "Senior React Developer".to_string(),
            description: "Build scalable web applications".to_string(),
            company_name: "TechCorp Inc".to_string(),
            location: "San Francisco, CA".to_string(),
            salary_min: Some(150),
            salary_max: Some(180),
            salary_currency: None,
            job_type: JobType::FullTime,
            category: Category::Technology,
            experience_level: ExperienceLevel::Senior,
            qualifications: Some("BS in Computer Science".to_string()),
            views: 7,
            skills: skills.map(str::to_string),
            created_at: "2024-03-01 10:00:00.000".to_string(),
            updated_at: "2024-03-01 10:00:00.000".to_string(),
        }
    }

    #[test]
    fn test_salary_is_nested_with_default_currency() {
        let posting = project(row(None));
        assert_eq!(
            posting.salary,
            Salary {
                min: Some(150),
                max: Some(180),
                currency: "USD".to_string()
            }
        );
        assert_eq!(posting.posted_by, 2);
        assert_eq!(posting.views, 7);
    }

    #[test]
    fn test_stored_currency_is_kept() {
        let mut r = row(None);
        r.salary_currency = Some("EUR".to_string());
        assert_eq!(project(r).salary.currency, "EUR");
    }

    #[test]
    fn test_skills_keep_order() {
        let posting = project(row(Some("React\u{1f}Node.js")));
        assert_eq!(posting.skills, vec!["React", "Node.js"]);
    }

    #[test]
    fn test_skill_with_comma_survives() {
        let posting = project(row(Some("Sales, B2B\u{1f}CRM")));
        assert_eq!(posting.skills, vec!["Sales, B2B", "CRM"]);
    }

    #[test]
    fn test_no_skills_is_empty_not_null() {
        assert!(project(row(None)).skills.is_empty());
        assert!(project(row(Some(""))).skills.is_empty());

        let json = serde_json::to_value(project(row(None))).unwrap();
        assert_eq!(json["skills"], serde_json::json!([]));
    }
}
