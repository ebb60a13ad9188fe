use serde::Deserialize;

use crate::models::RepositorySummary;

// GitHub API response structures
#[derive(Debug, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
}

impl From<GitHubRepo> for RepositorySummary {
    fn from(repo: GitHubRepo) -> Self {
        RepositorySummary {
            name: repo.name,
            description: repo.description,
            star_count: repo.stargazers_count,
        }
    }
}
