//! The process-wide remote store: a URL → remote-repo mapping that backs
//! `push`, `pull`, and `clone`.
//!
//! This is plain data, not a global — the "process-wide" requirement in the
//! spec is satisfied by the host application owning exactly one
//! [`RemoteStore`] and threading it through every [`crate::dispatcher`]
//! call, matching the single-threaded cooperative execution model. No
//! locking, no versioning beyond the commit DAG's own `commit_order`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::repo::Commit;

/// A remote repository: the same DAG shape as [`crate::repo::Repo`] minus
/// the working tree and index, which are purely local concepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRepo {
    pub commits: IndexMap<String, Commit>,
    pub commit_order: Vec<String>,
    pub branches: IndexMap<String, Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteStore {
    repos: IndexMap<String, RemoteRepo>,
}

impl RemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty remote (with an unborn `main`) on first use; no-op
    /// if it already exists.
    pub fn ensure_repo(&mut self, url: &str) -> &mut RemoteRepo {
        self.repos.entry(url.to_string()).or_insert_with(|| {
            let mut branches = IndexMap::new();
            branches.insert("main".to_string(), None);
            RemoteRepo { commits: IndexMap::new(), commit_order: Vec::new(), branches }
        })
    }

    /// Pure read — `None` if no remote has ever been created at this URL.
    pub fn get_repo(&self, url: &str) -> Option<&RemoteRepo> {
        self.repos.get(url)
    }

    /// Seed a remote with a fixed set of commits/branches — used once at
    /// startup to populate the tutorial's well-known seed remote.
    pub fn seed(&mut self, url: &str, repo: RemoteRepo) {
        self.repos.insert(url.to_string(), repo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_repo_creates_empty_remote_once() {
        let mut store = RemoteStore::new();
        assert!(store.get_repo("git://x").is_none());
        store.ensure_repo("git://x");
        assert_eq!(store.get_repo("git://x").unwrap().branches["main"], None);
    }

    #[test]
    fn ensure_repo_is_idempotent() {
        let mut store = RemoteStore::new();
        store.ensure_repo("git://x").branches.insert("dev".to_string(), None);
        store.ensure_repo("git://x");
        assert!(store.get_repo("git://x").unwrap().branches.contains_key("dev"));
    }
}
