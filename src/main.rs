mod board;
mod config;
mod db;
mod error;
mod filter;
mod matcher;
mod models;
mod pagination;
mod projection;
mod store;
mod tui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use board::JobBoard;
use config::Config;
use db::Database;
use filter::FilterCriteria;
use models::{Category, ExperienceLevel, JobPosting, JobType, NewJob, Role};
use pagination::PageRequest;
use store::RecordStore;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Job board - post, search, and apply to job listings")]
struct Cli {
    /// Database file (overrides JOBBOARD_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Post a job (employers only)
    Post(PostArgs),

    /// Search and list jobs
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show job details (counts a view)
    Show {
        /// Job ID
        id: i64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Apply to a job (job seekers only)
    Apply {
        /// Job ID
        job_id: i64,

        /// Applicant user ID
        #[arg(long = "as")]
        as_user: i64,
    },

    /// List applications for a job
    Applications {
        /// Job ID
        job_id: i64,
    },

    /// Rank jobs by keyword overlap
    Match {
        /// Skills or keywords, separated by spaces, commas or semicolons
        keywords: String,

        /// Number of matches to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Browse jobs interactively
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// job_seeker or employer
        #[arg(long, default_value = "job_seeker")]
        role: Role,

        /// Company name shown on postings
        #[arg(long)]
        company: Option<String>,
    },

    /// List users
    List,
}

#[derive(Args)]
struct FilterArgs {
    /// Text to find in title, description or company
    #[arg(short, long)]
    search: Option<String>,

    /// Technology, Design, Data, Product, Sales, Marketing, HR, Finance
    #[arg(short, long)]
    category: Option<Category>,

    /// Full-time, Part-time, Contract, Temporary, Internship, Remote
    #[arg(short = 't', long)]
    job_type: Option<JobType>,

    /// Entry, Junior, Mid-level, Senior, Lead, Executive
    #[arg(long)]
    level: Option<ExperienceLevel>,

    /// Text to find in the location
    #[arg(short, long)]
    location: Option<String>,

    /// Page number (defaults to 1)
    #[arg(short, long)]
    page: Option<String>,

    /// Jobs per page (defaults to 10)
    #[arg(long)]
    limit: Option<String>,
}

impl FilterArgs {
    fn criteria(self) -> FilterCriteria {
        FilterCriteria {
            page: PageRequest::parse(self.page.as_deref(), self.limit.as_deref()),
            search: self.search,
            category: self.category,
            job_type: self.job_type,
            experience_level: self.level,
            location: self.location,
        }
    }
}

#[derive(Args)]
struct PostArgs {
    /// Posting employer's user ID
    #[arg(long = "as")]
    as_user: i64,

    #[arg(long)]
    title: String,

    #[arg(long)]
    description: String,

    #[arg(long)]
    location: String,

    #[arg(short = 't', long)]
    job_type: JobType,

    #[arg(short, long)]
    category: Category,

    #[arg(long)]
    level: ExperienceLevel,

    #[arg(long)]
    salary_min: Option<i64>,

    #[arg(long)]
    salary_max: Option<i64>,

    /// Currency code (defaults to USD)
    #[arg(long)]
    currency: Option<String>,

    #[arg(long)]
    qualifications: Option<String>,

    /// Comma-separated skills
    #[arg(long, value_delimiter = ',')]
    skills: Vec<String>,
}

impl PostArgs {
    fn into_job(self) -> (i64, NewJob) {
        let job = NewJob {
            title: self.title,
            description: self.description,
            location: self.location,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            salary_currency: self.currency,
            job_type: self.job_type,
            category: self.category,
            experience_level: self.level,
            qualifications: self.qualifications,
            skills: self.skills,
        };
        (self.as_user, job)
    }
}

fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(path) = cli.db {
        config.database_path = path;
    }
    init_tracing(&config);

    let db = Database::open(&config.database_path)?;
    if !matches!(cli.command, Commands::Init) {
        db.ensure_initialized()?;
    }
    let board = JobBoard::new(db);

    match cli.command {
        Commands::Init => {
            board.store().init()?;
            println!("Database initialized at {}", config.database_path.display());
        }

        Commands::User { command } => match command {
            UserCommands::Add {
                name,
                email,
                role,
                company,
            } => {
                let id = board
                    .store()
                    .create_user(&name, &email, role, company.as_deref())?;
                println!("Added {} '{}' (ID: {})", role, name, id);
            }

            UserCommands::List => {
                let users = board.store().list_users()?;
                if users.is_empty() {
                    println!("No users found.");
                } else {
                    println!("{:<6} {:<12} {:<20} {:<28} {:<20}", "ID", "ROLE", "NAME", "EMAIL", "COMPANY");
                    println!("{}", "-".repeat(90));
                    for user in users {
                        println!(
                            "{:<6} {:<12} {:<20} {:<28} {:<20}",
                            user.id,
                            user.role,
                            truncate(&user.name, 18),
                            truncate(&user.email, 26),
                            truncate(&user.company.unwrap_or_default(), 18)
                        );
                    }
                }
            }
        },

        Commands::Post(args) => {
            let (poster, job) = args.into_job();
            let id = board.post_job(poster, job)?;
            println!("Posted job #{}", id);
        }

        Commands::List { filters, json } => {
            let page = board.list_jobs(&filters.criteria())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else if page.data.is_empty() {
                println!("No jobs found.");
                if page.pagination.total > 0 {
                    println!(
                        "Page {} is past the last page ({} of {} jobs).",
                        page.pagination.page, page.pagination.pages, page.pagination.total
                    );
                }
            } else {
                println!(
                    "{:<6} {:<11} {:<28} {:<18} {:<18} {:>16}",
                    "ID", "TYPE", "TITLE", "COMPANY", "LOCATION", "SALARY"
                );
                println!("{}", "-".repeat(102));
                for job in &page.data {
                    println!(
                        "{:<6} {:<11} {:<28} {:<18} {:<18} {:>16}",
                        job.id,
                        job.job_type,
                        truncate(&job.title, 26),
                        truncate(&job.company_name, 16),
                        truncate(&job.location, 16),
                        job.salary.range().unwrap_or_else(|| "-".to_string())
                    );
                }
                println!(
                    "\nPage {} of {} ({} jobs)",
                    page.pagination.page, page.pagination.pages, page.pagination.total
                );
            }
        }

        Commands::Show { id, json } => match board.get_job(id) {
            Ok(job) => {
                if json {
                    let body = serde_json::json!({ "data": job });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                } else {
                    print_job(&job);
                }
            }
            Err(e) if e.is_not_found() => {
                println!("Job #{} not found.", id);
            }
            Err(e) => return Err(e).context("Failed to load job"),
        },

        Commands::Apply { job_id, as_user } => {
            board.apply(job_id, as_user)?;
            println!("Application submitted for job #{}.", job_id);
        }

        Commands::Applications { job_id } => {
            let applications = board.applications(job_id)?;
            if applications.is_empty() {
                println!("No applications for job #{}.", job_id);
            } else {
                println!("{:<6} {:<24} {:<12} {:<24}", "ID", "APPLICANT", "STATUS", "APPLIED");
                println!("{}", "-".repeat(66));
                for app in applications {
                    let applicant = board
                        .store()
                        .get_user(app.user_id)?
                        .map(|u| u.name)
                        .unwrap_or_else(|| format!("user #{}", app.user_id));
                    println!(
                        "{:<6} {:<24} {:<12} {:<24}",
                        app.id,
                        truncate(&applicant, 22),
                        app.status,
                        app.applied_at
                    );
                }
            }
        }

        Commands::Match { keywords, limit } => {
            let jobs = board.all_jobs()?;
            let matches = matcher::match_jobs(&jobs, &keywords);
            if matches.is_empty() {
                println!("No matches for '{}'.", keywords);
            } else {
                println!("{:<5} {:<6} {:>5}  {:<28} {:<18} {:<18}", "RANK", "ID", "SCORE", "TITLE", "COMPANY", "LOCATION");
                println!("{}", "-".repeat(84));
                for (i, m) in matches.iter().take(limit).enumerate() {
                    println!(
                        "{:<5} {:<6} {:>5}  {:<28} {:<18} {:<18}",
                        i + 1,
                        m.job.id,
                        m.score,
                        truncate(&m.job.title, 26),
                        truncate(&m.job.company_name, 16),
                        truncate(&m.job.location, 16)
                    );
                }
            }
        }

        Commands::Browse { filters } => {
            tui::run_browse(&board, filters.criteria())?;
        }
    }

    Ok(())
}

fn print_job(job: &JobPosting) {
    println!("Job #{}", job.id);
    println!("Title: {}", job.title);
    println!("Company: {}", job.company_name);
    println!("Location: {}", job.location);
    println!("Type: {}", job.job_type);
    println!("Category: {}", job.category);
    println!("Level: {}", job.experience_level);
    if let Some(range) = job.salary.range() {
        println!("Salary: {}", range);
    }
    if !job.skills.is_empty() {
        println!("Skills: {}", job.skills.join(", "));
    }
    println!("Views: {}", job.views);
    println!("Posted: {}", job.created_at);
    println!("\n--- Description ---\n{}", job.description);
    if let Some(quals) = &job.qualifications {
        println!("\n--- Qualifications ---\n{}", quals);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Senior React Developer", 10), "Senior ...");
        assert_eq!(truncate("Développeur", 8), "Dével...");
    }

    #[test]
    fn test_filter_args_coerce_pagination() {
        let cli = Cli::try_parse_from([
            "jobboard", "list", "--category", "technology", "--page", "two", "--limit", "5",
        ])
        .unwrap();
        let Commands::List { filters, json } = cli.command else {
            panic!("expected list");
        };
        assert!(!json);
        let criteria = filters.criteria();
        assert_eq!(criteria.category, Some(Category::Technology));
        assert_eq!(criteria.page.page(), 1);
        assert_eq!(criteria.page.limit(), 5);
    }

    #[test]
    fn test_post_args_split_skills() {
        let cli = Cli::try_parse_from([
            "jobboard", "post", "--as", "2", "--title", "Data Analyst", "--description", "SQL work",
            "--location", "Boston, MA", "-t", "full-time", "-c", "Data", "--level", "junior",
            "--skills", "SQL,Python,Tableau",
        ])
        .unwrap();
        let Commands::Post(args) = cli.command else {
            panic!("expected post");
        };
        let (poster, job) = args.into_job();
        assert_eq!(poster, 2);
        assert_eq!(job.job_type, JobType::FullTime);
        assert_eq!(job.experience_level, ExperienceLevel::Junior);
        assert_eq!(job.skills, vec!["SQL", "Python", "Tableau"]);
    }

    #[test]
    fn test_unknown_category_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["jobboard", "list", "--category", "Gardening"]);
        assert!(result.is_err());
    }
}
