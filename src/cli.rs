use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repo-browser")]
#[command(about = "Repository Browser - Lists the repositories of a GitHub organization or user")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// File the settings are persisted to
    #[arg(long, env = "REPO_BROWSER_STORE", default_value = ".repo-browser.json")]
    pub store: PathBuf,

    /// Keep settings in memory only
    #[arg(long)]
    pub memory: bool,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// URL scheme accepted for deep links
    #[arg(long, env = "REPO_BROWSER_SCHEME", default_value = "sporty")]
    pub scheme: String,

    /// Deep link delivered at start-up, routed once the first list has loaded
    #[arg(long)]
    pub open: Option<String>,
}
