//! The user/puppet directory the formatter resolves mentions through.
//!
//! The directory is owned by the bridge (database, caches, profile sync). The
//! formatter only reads from it, apart from the lazy puppet creation the
//! directory performs on its own when it first sees a Signal account.
use crate::common::Result;
use crate::types::UserId;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// A Matrix ghost user representing a Signal account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puppet {
    pub uuid: Uuid,
    /// Profile name synced from Signal, if known
    pub name: Option<String>,
    pub mxid: UserId,
}

impl Puppet {
    /// Name shown for a mention: the profile name, or the mxid when the
    /// profile name is missing or empty.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(self.mxid.as_str())
    }
}

/// Lookups needed by both conversion directions.
///
/// Implementations may suspend (database or network access). Concurrent
/// calls for the same unseen account may race on puppet creation; the
/// formatter accepts whichever record comes back.
pub trait Directory: Send + Sync {
    /// Resolve the puppet for a Signal account, creating it if needed.
    fn puppet_by_uuid(&self, uuid: Uuid) -> impl Future<Output = Result<Puppet>> + Send;

    /// Signal account linked to a logged-in bridge user.
    fn user_by_mxid(&self, mxid: &UserId) -> impl Future<Output = Result<Option<Uuid>>> + Send;

    /// Signal account behind a puppet mxid. Never creates a puppet.
    fn puppet_by_mxid(&self, mxid: &UserId) -> impl Future<Output = Result<Option<Uuid>>> + Send;
}

impl<D: Directory> Directory for Arc<D> {
    fn puppet_by_uuid(&self, uuid: Uuid) -> impl Future<Output = Result<Puppet>> + Send {
        (**self).puppet_by_uuid(uuid)
    }

    fn user_by_mxid(&self, mxid: &UserId) -> impl Future<Output = Result<Option<Uuid>>> + Send {
        (**self).user_by_mxid(mxid)
    }

    fn puppet_by_mxid(&self, mxid: &UserId) -> impl Future<Output = Result<Option<Uuid>>> + Send {
        (**self).puppet_by_mxid(mxid)
    }
}
