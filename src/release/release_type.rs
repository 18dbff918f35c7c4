//! Release types registered with the release builder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A release strategy known to the release builder.
///
/// The string form (kebab-case) is the name used in `.github/release-please.yml`
/// and on the builder's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseType {
    Dart,
    Elixir,
    Go,
    GoYoshi,
    Helm,
    JavaBom,
    JavaLts,
    JavaYoshi,
    KrmBlueprint,
    Node,
    Ocaml,
    PhpYoshi,
    Python,
    Ruby,
    RubyYoshi,
    Rust,
    Simple,
    TerraformModule,
}

impl ReleaseType {
    /// Every release type, in name order.
    pub const ALL: [ReleaseType; 18] = [
        ReleaseType::Dart,
        ReleaseType::Elixir,
        ReleaseType::Go,
        ReleaseType::GoYoshi,
        ReleaseType::Helm,
        ReleaseType::JavaBom,
        ReleaseType::JavaLts,
        ReleaseType::JavaYoshi,
        ReleaseType::KrmBlueprint,
        ReleaseType::Node,
        ReleaseType::Ocaml,
        ReleaseType::PhpYoshi,
        ReleaseType::Python,
        ReleaseType::Ruby,
        ReleaseType::RubyYoshi,
        ReleaseType::Rust,
        ReleaseType::Simple,
        ReleaseType::TerraformModule,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Dart => "dart",
            ReleaseType::Elixir => "elixir",
            ReleaseType::Go => "go",
            ReleaseType::GoYoshi => "go-yoshi",
            ReleaseType::Helm => "helm",
            ReleaseType::JavaBom => "java-bom",
            ReleaseType::JavaLts => "java-lts",
            ReleaseType::JavaYoshi => "java-yoshi",
            ReleaseType::KrmBlueprint => "krm-blueprint",
            ReleaseType::Node => "node",
            ReleaseType::Ocaml => "ocaml",
            ReleaseType::PhpYoshi => "php-yoshi",
            ReleaseType::Python => "python",
            ReleaseType::Ruby => "ruby",
            ReleaseType::RubyYoshi => "ruby-yoshi",
            ReleaseType::Rust => "rust",
            ReleaseType::Simple => "simple",
            ReleaseType::TerraformModule => "terraform-module",
        }
    }

    /// Looks up a release type by its exact name.
    pub fn from_name(name: &str) -> Option<ReleaseType> {
        ReleaseType::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for release_type in ReleaseType::ALL {
            assert_eq!(ReleaseType::from_name(release_type.as_str()), Some(release_type));
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let parsed: ReleaseType = serde_json::from_str("\"java-yoshi\"").unwrap();
        assert_eq!(parsed, ReleaseType::JavaYoshi);
        assert_eq!(
            serde_json::to_string(&ReleaseType::TerraformModule).unwrap(),
            "\"terraform-module\""
        );
    }

    #[test]
    fn from_name_is_exact() {
        assert_eq!(ReleaseType::from_name("Python"), None);
        assert_eq!(ReleaseType::from_name("python"), Some(ReleaseType::Python));
    }
}
