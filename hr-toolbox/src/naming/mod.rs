// Group naming service: asks a text-generation model for themed team names.

pub mod client;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;

/// Something that can propose names for a set of groups.
///
/// Implementations may return fewer names than requested; callers apply
/// whatever comes back positionally.
#[async_trait]
pub trait NameSource: Send + Sync {
    async fn suggest_names(&self, count: usize, theme: &str) -> anyhow::Result<Vec<String>>;
}

/// Reasons a naming request is refused before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("generate groups before requesting names")]
    NoGroups,

    #[error("group naming is already in progress")]
    InFlight,
}
