//! Validation of configuration changes proposed in a pull request.

use tracing::{debug, info};

use crate::effects::requests::{self, GitHubCallError};
use crate::effects::{CheckConclusion, GitHubInterpreter};
use crate::types::{PrNumber, Sha};

use super::config::{WELL_KNOWN_CONFIGURATION_FILE, parse_config};

/// Name of the check run reporting a schema violation.
pub const CHECK_NAME: &str = "checkConfigSchema";

/// What the guard found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The pull request does not touch the configuration file.
    Untouched,
    /// The pull request deletes the configuration file.
    Removed,
    /// The proposed file is valid.
    Valid,
    /// The proposed file is invalid; a failed check run was created.
    Invalid { problem: String },
}

/// Checks the configuration file as proposed by pull request `pr` at
/// `head_sha`, reporting a violation as a failed check run on the head commit.
pub async fn check_config_changes<G: GitHubInterpreter>(
    github: &G,
    pr: PrNumber,
    head_sha: &Sha,
) -> Result<GuardOutcome, GitHubCallError> {
    let files = requests::list_pr_files(github, pr).await?;
    if !files.iter().any(|f| f == WELL_KNOWN_CONFIGURATION_FILE) {
        debug!(%pr, "Pull request does not touch the configuration file");
        return Ok(GuardOutcome::Untouched);
    }

    let Some(text) = requests::get_file_contents(
        github,
        WELL_KNOWN_CONFIGURATION_FILE,
        Some(head_sha.as_str()),
    )
    .await?
    else {
        debug!(%pr, "Pull request removes the configuration file");
        return Ok(GuardOutcome::Removed);
    };

    let problem = match parse_config(&text) {
        Ok(_) => return Ok(GuardOutcome::Valid),
        Err(e) => e.to_string(),
    };

    info!(%pr, sha = %head_sha.short(), %problem, "Proposed configuration is invalid");
    requests::create_check_run(
        github,
        head_sha,
        CHECK_NAME,
        CheckConclusion::Failure,
        "Invalid release-please configuration",
        format!("`{WELL_KNOWN_CONFIGURATION_FILE}` does not match the schema:\n\n* {problem}"),
    )
    .await?;

    Ok(GuardOutcome::Invalid { problem })
}
