use crate::models::JobPosting;

#[derive(Debug, Clone)]
pub struct Match<'a> {
    pub job: &'a JobPosting,
    pub score: usize,
}

/// Lowercased keywords split on whitespace, commas and semicolons.
pub fn keywords(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Scores each posting by how many keywords occur in its title, description or skills.
/// Postings with no hits are dropped; the rest come back best first, ties in input order.
pub fn match_jobs<'a>(jobs: &'a [JobPosting], input: &str) -> Vec<Match<'a>> {
    let wanted = keywords(input);
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<Match> = jobs
        .iter()
        .filter_map(|job| {
            let haystack = format!(
                "{} {} {}",
                job.title,
                job.description,
                job.skills.join(" ")
            )
            .to_lowercase();
            let score = wanted.iter().filter(|k| haystack.contains(k.as_str())).count();
            (score > 0).then_some(Match { job, score })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}
