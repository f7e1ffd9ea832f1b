use thiserror::Error;

/// Errors reported by a diff invocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// The configuration was rejected before diffing.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    /// A token link is not mirrored by the other text version.
    #[error("token {index} links to {link} which does not link back")]
    BrokenLink { index: usize, link: usize },
    /// A token list is cyclic or points outside of its arena.
    #[error("token list is corrupted at index {index}")]
    BrokenList { index: usize },
    /// The fragment stream does not reproduce one of the versions.
    #[error("diff is not consistent with the {version} text")]
    Inconsistent { version: &'static str },
}
