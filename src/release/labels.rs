//! Release pull request labels and their lifecycle.
//!
//! A release pull request carries its state as labels rather than in any local
//! store:
//!
//! | State | Label |
//! |-------|-------|
//! | `None` | neither lifecycle label |
//! | `Pending` | `autorelease: pending` |
//! | `Closed` | `autorelease: closed` |
//!
//! Transitions:
//!
//! - `Pending` --close (unmerged)--> `Closed`
//! - `Closed` --reopen--> `Pending`
//!
//! A pull request may carry both labels; each event checks only the label
//! of the state it leaves. Every other combination is a no-op. A merge
//! consumes `Pending` on the publish path, which is not tracked here.

use crate::effects::LabelSpec;

/// Label carried by an open release pull request awaiting merge.
pub const PENDING_LABEL: &str = "autorelease: pending";

/// Label carried by a release pull request closed without merging.
pub const CLOSED_LABEL: &str = "autorelease: closed";

/// Label applied by the publisher once the release is tagged.
pub const TAGGED_LABEL: &str = "autorelease: tagged";

/// Label applied once the release has been published.
pub const PUBLISHED_LABEL: &str = "autorelease: published";

/// Label marking a snapshot release pull request.
pub const SNAPSHOT_LABEL: &str = "autorelease: snapshot";

/// Adding this label to any pull request forces a release PR run for its
/// base branch. The bot removes it immediately.
pub const FORCE_RUN_LABEL: &str = "release-please:force-run";

/// The label set kept in sync on every scheduled tick.
pub fn release_labels() -> Vec<LabelSpec> {
    [
        (PENDING_LABEL, "ededed", "Release PR is awaiting merge"),
        (TAGGED_LABEL, "ededed", "Release PR has been merged and tagged"),
        (PUBLISHED_LABEL, "ededed", "The release has been published"),
        (CLOSED_LABEL, "ededed", "Release PR was closed without merging"),
        (SNAPSHOT_LABEL, "ededed", "Release PR bumps to a snapshot version"),
        (FORCE_RUN_LABEL, "e99695", "Force a release PR run for the base branch"),
    ]
    .into_iter()
    .map(|(name, color, description)| LabelSpec {
        name: name.to_string(),
        color: color.to_string(),
        description: description.to_string(),
    })
    .collect()
}

/// Lifecycle state of a release pull request, named by the label it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseLabelState {
    None,
    Pending,
    Closed,
}

impl ReleaseLabelState {
    /// The label marking this state.
    pub fn label(self) -> Option<&'static str> {
        match self {
            ReleaseLabelState::None => None,
            ReleaseLabelState::Pending => Some(PENDING_LABEL),
            ReleaseLabelState::Closed => Some(CLOSED_LABEL),
        }
    }
}

/// Pull request lifecycle events the state machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Closed { merged: bool },
    Reopened,
}

/// The label operations that move a pull request to its next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTransition {
    pub remove: &'static str,
    pub add: &'static str,
    pub to: ReleaseLabelState,
}

/// Computes the transition `event` causes for a pull request labeled
/// `labels`, if any.
///
/// Each event only looks at the label of the state it leaves: an unmerged
/// close needs `autorelease: pending`, a reopen needs `autorelease: closed`.
/// Other labels, including the opposite lifecycle label, do not matter.
pub fn transition<S: AsRef<str>>(labels: &[S], event: LifecycleEvent) -> Option<LabelTransition> {
    let (from, to) = match event {
        LifecycleEvent::Closed { merged: false } => {
            (ReleaseLabelState::Pending, ReleaseLabelState::Closed)
        }
        LifecycleEvent::Closed { merged: true } => return None,
        LifecycleEvent::Reopened => (ReleaseLabelState::Closed, ReleaseLabelState::Pending),
    };
    let remove = from.label()?;
    let add = to.label()?;

    labels
        .iter()
        .any(|l| l.as_ref() == remove)
        .then_some(LabelTransition { remove, add, to })
}
