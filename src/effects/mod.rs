//! Effects-as-data for GitHub operations.
//!
//! This module defines effect types that describe operations without executing them.
//! This enables:
//! - Orchestration logic that can be tested against a recording interpreter
//! - Logging/tracing of intended operations
//! - A single seam between the bot and the GitHub API

pub mod github;
pub mod interpreter;
pub mod requests;

pub use github::{CheckConclusion, GitHubEffect, GitHubResponse, LabelSpec, RepositoryData};
pub use interpreter::GitHubInterpreter;
pub use requests::GitHubCallError;
