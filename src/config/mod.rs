use std::env;
use std::path::PathBuf;

/// Engine configuration: the primary branch name, the auto-commit message
/// and the file patterns tied to the host application's project layout.
#[derive(Debug, Clone)]
pub struct Config {
    /// Designated main line of history. Branch protection compares against
    /// this exact name.
    pub primary_branch: String,
    /// Message used when the change reactor commits on the user's behalf.
    pub auto_commit_message: String,
    /// Patterns written to the ignore file at bootstrap time.
    pub ignore_patterns: Vec<String>,
    /// Extensions of the project files the host reloads after a checkout.
    pub project_file_extensions: Vec<String>,
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config {
            primary_branch: "master".to_string(),
            auto_commit_message: "Auto commit".to_string(),
            ignore_patterns: vec![
                "Backup/".to_string(),
                "Ableton Project Info/".to_string(),
            ],
            project_file_extensions: vec!["als".to_string(), "alc".to_string()],
        };

        #[cfg(not(test))]
        config.load_from_env_file();
        // Environment variables override the config file.
        config.load_from_env();

        config
    }

    pub fn load_from_env_file(&mut self) {
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(format!("{}/.dawgit/.env", home));
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }
        dotenvy::dotenv().ok();
    }

    pub fn load_from_env(&mut self) {
        if let Ok(branch) = env::var("DAWGIT_PRIMARY_BRANCH") {
            if !branch.trim().is_empty() {
                self.primary_branch = branch.trim().to_string();
            }
        }
        if let Ok(message) = env::var("DAWGIT_AUTO_COMMIT_MESSAGE") {
            if !message.trim().is_empty() {
                self.auto_commit_message = message.trim().to_string();
            }
        }
        if let Ok(extensions) = env::var("DAWGIT_PROJECT_FILE_EXTENSIONS") {
            let parsed = parse_extension_list(&extensions);
            if !parsed.is_empty() {
                self.project_file_extensions = parsed;
            }
        }
    }
}

/// Parse a comma-separated extension list, dropping blanks and leading dots.
fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config {
            primary_branch: "master".to_string(),
            auto_commit_message: "Auto commit".to_string(),
            ignore_patterns: vec![
                "Backup/".to_string(),
                "Ableton Project Info/".to_string(),
            ],
            project_file_extensions: vec!["als".to_string(), "alc".to_string()],
        };
        assert_eq!(config.primary_branch, "master");
        assert_eq!(config.auto_commit_message, "Auto commit");
        assert_eq!(config.ignore_patterns.len(), 2);
        assert_eq!(config.project_file_extensions, vec!["als", "alc"]);
    }

    #[test]
    fn test_extension_parsing_strips_dots_and_blanks() {
        assert_eq!(
            parse_extension_list(".als, .alc, ,flp"),
            vec!["als", "alc", "flp"]
        );
        assert!(parse_extension_list("").is_empty());
        assert!(parse_extension_list(" , ,").is_empty());
    }
}
