//! Release orchestration: configuration, branch matching, strategy building,
//! and the release pull request label lifecycle.

pub mod builder;
pub mod config;
pub mod guard;
pub mod labels;
pub mod matcher;
pub mod release_type;
pub mod resolver;
pub mod strategy;

pub use builder::{CommandReleaser, PublishRequest, ReleaseBuilder, ReleaseError, ReleasePublisher};
pub use config::{
    BranchConfiguration, BranchEntry, ConfigValidationError, ReleaseSettings,
    RepositoryConfiguration, WELL_KNOWN_CONFIGURATION_FILE, merge_defaults,
};
pub use guard::{GuardOutcome, check_config_changes};
pub use labels::{LabelTransition, LifecycleEvent, ReleaseLabelState};
pub use matcher::{BranchLookupError, find_branch_configuration};
pub use release_type::ReleaseType;
pub use resolver::{ResolveError, load_config, resolve_config};
pub use strategy::{RepositoryFacts, ReleaseStrategy, StrategyError, build_strategy};
