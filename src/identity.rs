//! Ownership lookup for privilege separation
//!
//! After a request resolves, a privilege-separation subsystem can ask who
//! owns the recorded virtual root and assume that identity before touching
//! tenant files. Unix only.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use nix::unistd::{Gid, Uid};

use crate::resolve::ResolvedMapping;

/// The uid/gid a request should execute under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnixIdentity {
    pub uid: Uid,
    pub gid: Gid,
}

/// Owner of the given virtual root, or `None` when it cannot be statted.
pub fn owner_of(root: &Path) -> Option<UnixIdentity> {
    let meta = fs::metadata(root).ok()?;
    Some(UnixIdentity {
        uid: Uid::from_raw(meta.uid()),
        gid: Gid::from_raw(meta.gid()),
    })
}

impl ResolvedMapping {
    /// Identity owning this mapping's virtual root.
    pub fn owner(&self) -> Option<UnixIdentity> {
        owner_of(&self.virtual_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_the_owner_of_an_existing_root() {
        let dir = tempfile::tempdir().unwrap();
        let meta = fs::metadata(dir.path()).unwrap();

        let identity = owner_of(dir.path()).unwrap();
        assert_eq!(identity.uid.as_raw(), meta.uid());
        assert_eq!(identity.gid.as_raw(), meta.gid());
    }

    #[test]
    fn unavailable_when_the_root_cannot_be_statted() {
        assert!(owner_of(Path::new("/nonexistent/velohost/root")).is_none());
    }
}
