//! Loading the repository configuration file.
//!
//! A missing file is not an error: it means the bot is not enabled for the
//! repository, and every handler turns it into a no-op.

use thiserror::Error;
use tracing::debug;

use crate::effects::GitHubInterpreter;
use crate::effects::requests::{self, GitHubCallError};

use super::config::{
    ConfigValidationError, RepositoryConfiguration, WELL_KNOWN_CONFIGURATION_FILE, parse_config,
};

/// Errors from loading the configuration file.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    GitHub(#[from] GitHubCallError),

    /// The file exists but does not satisfy the schema.
    #[error("{path}: {source}")]
    InvalidConfig {
        path: &'static str,
        #[source]
        source: ConfigValidationError,
    },
}

/// Reads and validates the configuration file from the default branch.
///
/// Returns `Ok(None)` if the file does not exist. `primary_branch` is left as
/// written in the file.
pub async fn load_config<G: GitHubInterpreter>(
    github: &G,
) -> Result<Option<RepositoryConfiguration>, ResolveError> {
    let Some(text) =
        requests::get_file_contents(github, WELL_KNOWN_CONFIGURATION_FILE, None).await?
    else {
        return Ok(None);
    };

    parse_config(&text)
        .map(Some)
        .map_err(|source| ResolveError::InvalidConfig {
            path: WELL_KNOWN_CONFIGURATION_FILE,
            source,
        })
}

/// Reads the configuration file and fills in `primary_branch` from the
/// repository's default branch when the file does not set it.
pub async fn resolve_config<G: GitHubInterpreter>(
    github: &G,
) -> Result<Option<RepositoryConfiguration>, ResolveError> {
    let Some(mut config) = load_config(github).await? else {
        return Ok(None);
    };

    if config.primary_branch.is_none() {
        let repository = requests::get_repository(github).await?;
        debug!(
            default_branch = %repository.default_branch,
            "Using repository default branch as primary branch"
        );
        config.primary_branch = Some(repository.default_branch);
    }

    Ok(Some(config))
}
