//! Service configuration loaded from environment variables.
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `GITHUB_TOKEN` | yes | |
//! | `WEBHOOK_SECRET` | yes | |
//! | `LISTEN_ADDR` | no | `0.0.0.0:3000` |
//! | `RELEASE_COMMAND` | no | `release-please-runner` |
//! | `GITHUB_API_URL` | no | api.github.com |

use std::env;
use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

use crate::release::CommandReleaser;
use crate::webhooks::WebhookSecret;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_RELEASE_COMMAND: &str = "release-please-runner";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

/// Settings for one running instance of the bot.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Token used for the GitHub API and handed to the release tool.
    pub github_token: String,
    pub webhook_secret: WebhookSecret,
    pub listen_addr: SocketAddr,
    /// The release tool executable.
    pub release_program: String,
    /// Arguments placed before the tool's subcommand.
    pub release_args: Vec<String>,
    /// GitHub Enterprise Server API root, if not api.github.com.
    pub github_api_url: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingEnvVar(name))
        };

        let github_token = required("GITHUB_TOKEN")?;
        let webhook_secret = WebhookSecret::new(required("WEBHOOK_SECRET")?);

        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("LISTEN_ADDR"))?;

        let command = lookup("RELEASE_COMMAND").unwrap_or_else(|| DEFAULT_RELEASE_COMMAND.to_string());
        let mut words = command.split_whitespace().map(str::to_string);
        let release_program = words
            .next()
            .ok_or(ConfigError::InvalidValue("RELEASE_COMMAND"))?;
        let release_args = words.collect();

        let github_api_url = lookup("GITHUB_API_URL").filter(|value| !value.is_empty());

        Ok(Self {
            github_token,
            webhook_secret,
            listen_addr,
            release_program,
            release_args,
            github_api_url,
        })
    }

    /// The release tool configured by `RELEASE_COMMAND`.
    pub fn releaser(&self) -> CommandReleaser {
        let releaser = CommandReleaser::new(&self.release_program, &self.github_token)
            .with_args(&self.release_args);
        match &self.github_api_url {
            Some(url) => releaser.with_api_url(url),
            None => releaser,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("release_program", &self.release_program)
            .field("release_args", &self.release_args)
            .field("github_api_url", &self.github_api_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|name| vars.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("GITHUB_TOKEN", "ghp_x"), ("WEBHOOK_SECRET", "s3cret")];

    #[test]
    fn defaults_apply() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.github_token, "ghp_x");
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.release_program, "release-please-runner");
        assert!(config.release_args.is_empty());
        assert_eq!(config.github_api_url, None);
    }

    #[test]
    fn missing_token_is_reported() {
        let err = load(&[("WEBHOOK_SECRET", "s3cret")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("GITHUB_TOKEN"));
    }

    #[test]
    fn empty_secret_counts_as_missing() {
        let err = load(&[("GITHUB_TOKEN", "ghp_x"), ("WEBHOOK_SECRET", "")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("WEBHOOK_SECRET"));
    }

    #[test]
    fn invalid_listen_addr_is_reported() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("LISTEN_ADDR", "localhost"));
        assert_eq!(load(&vars).unwrap_err(), ConfigError::InvalidValue("LISTEN_ADDR"));
    }

    #[test]
    fn release_command_splits_into_program_and_args() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("RELEASE_COMMAND", "npx release-please-runner --debug"));
        vars.push(("GITHUB_API_URL", "https://ghe.example.com/api/v3"));

        let config = load(&vars).unwrap();
        assert_eq!(config.release_program, "npx");
        assert_eq!(config.release_args, vec!["release-please-runner", "--debug"]);
        assert_eq!(
            config.github_api_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
    }

    #[test]
    fn blank_release_command_is_invalid() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("RELEASE_COMMAND", "   "));
        assert_eq!(load(&vars).unwrap_err(), ConfigError::InvalidValue("RELEASE_COMMAND"));
    }

    #[test]
    fn debug_hides_credentials() {
        let config = load(&REQUIRED).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ghp_x"));
        assert!(!rendered.contains("s3cret"));
    }
}
