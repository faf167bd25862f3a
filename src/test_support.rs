//! In-memory directory used by the unit tests.
use crate::common::{Error, Result};
use crate::directory::{Directory, Puppet};
use crate::types::UserId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use uuid::Uuid;

/// Directory backed by hash maps. Unknown accounts get a puppet on first
/// lookup by UUID, like the bridge does.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    puppets: Mutex<HashMap<Uuid, Puppet>>,
    users: HashMap<UserId, Uuid>,
    unavailable: bool,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_puppet(self, uuid: Uuid, name: Option<&str>, mxid: &str) -> Self {
        self.puppets.lock().insert(
            uuid,
            Puppet {
                uuid,
                name: name.map(str::to_string),
                mxid: UserId::from(mxid),
            },
        );
        self
    }

    pub fn with_user(mut self, mxid: &str, uuid: Uuid) -> Self {
        self.users.insert(UserId::from(mxid), uuid);
        self
    }

    /// Every lookup fails, as if the backing store were down.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn puppet_count(&self) -> usize {
        self.puppets.lock().len()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(Error::directory(io::Error::other("directory unavailable")));
        }
        Ok(())
    }
}

impl Directory for MemoryDirectory {
    async fn puppet_by_uuid(&self, uuid: Uuid) -> Result<Puppet> {
        self.check_available()?;
        let mut puppets = self.puppets.lock();
        let puppet = puppets.entry(uuid).or_insert_with(|| Puppet {
            uuid,
            name: None,
            mxid: UserId::new(format!("@signal_{uuid}:example.org")),
        });
        Ok(puppet.clone())
    }

    async fn user_by_mxid(&self, mxid: &UserId) -> Result<Option<Uuid>> {
        self.check_available()?;
        Ok(self.users.get(mxid).copied())
    }

    async fn puppet_by_mxid(&self, mxid: &UserId) -> Result<Option<Uuid>> {
        self.check_available()?;
        Ok(self
            .puppets
            .lock()
            .values()
            .find(|puppet| &puppet.mxid == mxid)
            .map(|puppet| puppet.uuid))
    }
}
