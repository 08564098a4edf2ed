use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::BoardError;

/// Declares a closed set of labels stored and displayed as text.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = BoardError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let labels: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        BoardError::InvalidInput(format!(
                            "unknown {} '{}' (expected one of: {})",
                            stringify!($name),
                            wanted,
                            labels.join(", ")
                        ))
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: BoardError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

labelled_enum!(
    /// Employment arrangement of a posting.
    JobType {
        FullTime => "Full-time",
        PartTime => "Part-time",
        Contract => "Contract",
        Temporary => "Temporary",
        Internship => "Internship",
        Remote => "Remote",
    }
);

labelled_enum!(
    Category {
        Technology => "Technology",
        Design => "Design",
        Data => "Data",
        Product => "Product",
        Sales => "Sales",
        Marketing => "Marketing",
        Hr => "HR",
        Finance => "Finance",
    }
);

labelled_enum!(
    ExperienceLevel {
        Entry => "Entry",
        Junior => "Junior",
        MidLevel => "Mid-level",
        Senior => "Senior",
        Lead => "Lead",
        Executive => "Executive",
    }
);

labelled_enum!(
    /// Employers post jobs, job seekers apply to them.
    Role {
        JobSeeker => "job_seeker",
        Employer => "employer",
    }
);

labelled_enum!(
    ApplicationStatus {
        Applied => "applied",
        Reviewed => "reviewed",
        Shortlisted => "shortlisted",
        Rejected => "rejected",
    }
);

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub company: Option<String>,
    pub created_at: String,
}

/// A posting as submitted by an employer, before it has an identity.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<String>,
    pub job_type: JobType,
    pub category: Category,
    pub experience_level: ExperienceLevel,
    pub qualifications: Option<String>,
    pub skills: Vec<String>,
}

/// Stored shape of a posting: flat salary columns and the aggregated skill string.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<String>,
    pub job_type: JobType,
    pub category: Category,
    pub experience_level: ExperienceLevel,
    pub qualifications: Option<String>,
    pub views: i64,
    pub skills: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: String,
}

impl Salary {
    /// Human-readable range, or `None` when neither bound is known.
    pub fn range(&self) -> Option<String> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(format!("{} - {} {}", min, max, self.currency)),
            (Some(min), None) => Some(format!("{}+ {}", min, self.currency)),
            (None, Some(max)) => Some(format!("up to {} {}", max, self.currency)),
            (None, None) => None,
        }
    }
}

/// Public representation of a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub salary: Salary,
    pub job_type: JobType,
    pub category: Category,
    pub experience_level: ExperienceLevel,
    pub skills: Vec<String>,
    pub qualifications: Option<String>,
    pub views: i64,
    pub posted_by: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub user_id: i64,
    pub status: ApplicationStatus,
    pub applied_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_case_insensitively() {
        assert_eq!("full-time".parse::<JobType>().unwrap(), JobType::FullTime);
        assert_eq!("MID-LEVEL".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::MidLevel);
        assert_eq!(" hr ".parse::<Category>().unwrap(), Category::Hr);
        assert_eq!("employer".parse::<Role>().unwrap(), Role::Employer);
    }

    #[test]
    fn test_unknown_label_lists_choices() {
        let err = "Gig".parse::<JobType>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Gig"));
        assert!(msg.contains("Full-time"));
        assert!(msg.contains("Internship"));
    }

    #[test]
    fn test_salary_range() {
        let salary = |min, max| Salary {
            min,
            max,
            currency: "USD".to_string(),
        };
        assert_eq!(salary(Some(80), Some(120)).range().as_deref(), Some("80 - 120 USD"));
        assert_eq!(salary(Some(80), None).range().as_deref(), Some("80+ USD"));
        assert_eq!(salary(None, Some(120)).range().as_deref(), Some("up to 120 USD"));
        assert_eq!(salary(None, None).range(), None);
    }

    #[test]
    fn test_posting_serializes_camel_case_with_labels() {
        let posting = JobPosting {
            id: 1,
            title: "Data Analyst".to_string(),
            description: "Analyze business data".to_string(),
            company_name: "Analytics Corp".to_string(),
            location: "Boston, MA".to_string(),
            salary: Salary {
                min: Some(90),
                max: Some(130),
                currency: DEFAULT_CURRENCY.to_string(),
            },
            job_type: JobType::FullTime,
            category: Category::Data,
            experience_level: ExperienceLevel::Junior,
            skills: vec!["SQL".to_string()],
            qualifications: None,
            views: 3,
            posted_by: 2,
            created_at: "2024-01-01 00:00:00.000".to_string(),
            updated_at: "2024-01-01 00:00:00.000".to_string(),
        };

        let json = serde_json::to_value(&posting).unwrap();
        assert_eq!(json["companyName"], "Analytics Corp");
        assert_eq!(json["jobType"], "Full-time");
        assert_eq!(json["experienceLevel"], "Junior");
        assert_eq!(json["salary"]["currency"], "USD");
        assert_eq!(json["skills"][0], "SQL");

        let back: JobPosting = serde_json::from_value(json).unwrap();
        assert_eq!(back, posting);
    }
}
