use colored::*;
use repo_browser::{
    Configuration, DeepLinkTarget, FetchStatus, RepoBrowserError, RepositoryKind,
    RepositorySummary,
};
use std::str::FromStr;
use std::sync::Mutex;

const EMPTY_MESSAGE: &str = "Something went wrong.\nWe are not able to get data for this user repositories at this moment.";

/// Line-oriented list screen
///
/// Keeps the last published list so a deep link can act on it.
#[derive(Default)]
pub struct ConsoleView {
    repositories: Mutex<Vec<RepositorySummary>>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, repositories: &[RepositorySummary]) {
        *self
            .repositories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = repositories.to_vec();
    }

    fn snapshot(&self) -> Vec<RepositorySummary> {
        self.repositories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn render_status(&self, status: &FetchStatus) {
        match status {
            FetchStatus::Idle => {}
            FetchStatus::Loading { request_id } => {
                println!("{}", format!("Loading (request #{})...", request_id).dimmed());
            }
            FetchStatus::Loaded { .. } | FetchStatus::Failed { .. } => self.render_list(),
        }
    }

    pub fn render_list(&self) {
        let repositories = self.snapshot();
        if repositories.is_empty() {
            println!("{}", EMPTY_MESSAGE.yellow());
            return;
        }

        println!("{}", "=".repeat(50).dimmed());
        for repository in &repositories {
            println!(
                "{}  {}",
                repository.name.bold(),
                format!("★ {}", repository.star_count).yellow()
            );
            if let Some(description) = &repository.description {
                println!("    {}", description.dimmed());
            }
        }
        println!("{}", "=".repeat(50).dimmed());
    }

    fn show_repository(&self, repository: &RepositorySummary) {
        println!("\n{}", repository.name.bold().green());
        println!(
            "{}",
            repository
                .description
                .as_deref()
                .unwrap_or("No description")
        );
        println!("Stars: {}\n", repository.star_count);
    }
}

impl DeepLinkTarget for ConsoleView {
    fn receive_deep_link(&self, _link: &str) {
        // Every link opens the first repository for now; links carry no
        // repository reference yet.
        match self.snapshot().first() {
            Some(repository) => self.show_repository(repository),
            None => println!("{}", "Nothing to open yet".yellow()),
        }
    }
}

pub fn print_configuration(config: &Configuration) {
    println!("Target: {}", config.target_name.bold());
    println!("Kind:   {}", config.kind);
    println!(
        "Token:  {}",
        if config.token.is_some() { "set" } else { "not set" }
    );
}

pub const HELP: &str = "\
Commands:
  refresh            fetch the list again
  name <name>        save a new organization or user name
  default            restore the default name
  kind org|user      save the target kind
  token [token]      save an access token, or clear it when omitted
  open <uri>         deliver a deep link
  config             show the saved settings
  stats              show fetch statistics
  help               show this help
  quit               exit";

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Refresh,
    ChangeName(String),
    RestoreDefaultName,
    ChangeKind(RepositoryKind),
    ChangeToken(Option<String>),
    Open(String),
    ShowConfig,
    ShowStats,
    Help,
    Quit,
}

impl FromStr for Intent {
    type Err = RepoBrowserError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let intent = match command {
            "refresh" | "r" => Intent::Refresh,
            // An empty name is passed through so validation rejects it.
            "name" => Intent::ChangeName(rest.to_string()),
            "default" => Intent::RestoreDefaultName,
            "kind" => Intent::ChangeKind(rest.parse()?),
            "token" if rest.is_empty() => Intent::ChangeToken(None),
            "token" => Intent::ChangeToken(Some(rest.to_string())),
            "open" if !rest.is_empty() => Intent::Open(rest.to_string()),
            "config" => Intent::ShowConfig,
            "stats" => Intent::ShowStats,
            "help" | "?" => Intent::Help,
            "quit" | "exit" | "q" => Intent::Quit,
            other => {
                return Err(RepoBrowserError::ValidationError(format!(
                    "Unknown command: {:?} (try `help`)",
                    other
                )))
            }
        };
        Ok(intent)
    }
}
