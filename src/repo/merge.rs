//! Ancestor queries and the three-way file merge, as pure functions of
//! commit snapshots.
//!
//! Kept free of `Repo` so the hard algorithmic core is independently
//! testable and so `Repo::merge` can stay a thin wrapper over it, per the
//! "implement as a pure function of three snapshots and the incoming branch
//! name" design note.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use super::Commit;

/// Walk first-and-second parents breadth-first from `start`, returning hash
/// → distance.
fn distances_from(commits: &IndexMap<String, Commit>, start: &str) -> IndexMap<String, u32> {
    let mut distances = IndexMap::new();
    let mut queue = VecDeque::new();
    distances.insert(start.to_string(), 0u32);
    queue.push_back(start.to_string());

    while let Some(hash) = queue.pop_front() {
        let dist = distances[&hash];
        let Some(commit) = commits.get(&hash) else { continue };
        for parent in &commit.parents {
            if !distances.contains_key(parent) {
                distances.insert(parent.clone(), dist + 1);
                queue.push_back(parent.clone());
            }
        }
    }
    distances
}

/// Is `ancestor` reachable from `descendant` by walking parent edges?
/// Reflexive: a commit is its own ancestor.
pub fn is_ancestor(commits: &IndexMap<String, Commit>, ancestor: &str, descendant: &str) -> bool {
    if ancestor == descendant {
        return true;
    }
    let mut queue = VecDeque::new();
    let mut seen: HashSet<String> = HashSet::new();
    queue.push_back(descendant.to_string());
    seen.insert(descendant.to_string());

    while let Some(hash) = queue.pop_front() {
        if hash == ancestor {
            return true;
        }
        let Some(commit) = commits.get(&hash) else { continue };
        for parent in &commit.parents {
            if seen.insert(parent.clone()) {
                queue.push_back(parent.clone());
            }
        }
    }
    false
}

/// Find the common ancestor of `a` and `b` minimizing summed BFS distance,
/// breaking ties by BFS discovery order (the order the `a`-side BFS first
/// encountered it).
pub fn common_ancestor(commits: &IndexMap<String, Commit>, a: &str, b: &str) -> Option<String> {
    let from_a = distances_from(commits, a);
    let from_b = distances_from(commits, b);

    from_a
        .iter()
        .filter_map(|(hash, da)| from_b.get(hash).map(|db| (hash.clone(), da + db)))
        .min_by_key(|(_, cost)| *cost)
        .map(|(hash, _)| hash)
}

/// Outcome of merging a single set of paths across three snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Resulting file content per path. For conflicting paths this holds
    /// the marker-annotated buffer, matching what the working tree should
    /// show for the user to resolve.
    pub files: IndexMap<String, String>,
    pub conflicts: Vec<String>,
}

/// Three-way merge of `ours` and `theirs` against `base`, over the union of
/// all three path sets. `incoming_branch` names the branch being merged in,
/// used only for the conflict marker's closing tag.
pub fn three_way_merge(
    base: &IndexMap<String, String>,
    ours: &IndexMap<String, String>,
    theirs: &IndexMap<String, String>,
    incoming_branch: &str,
) -> MergeOutcome {
    let mut paths: Vec<&String> = Vec::new();
    let mut seen = HashSet::new();
    for path in base.keys().chain(ours.keys()).chain(theirs.keys()) {
        if seen.insert(path.as_str()) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut files = IndexMap::new();
    let mut conflicts = Vec::new();

    for path in paths {
        let b = base.get(path);
        let o = ours.get(path);
        let t = theirs.get(path);

        if o == t {
            // Both sides agree (including both having deleted it).
            if let Some(content) = o {
                files.insert(path.clone(), content.clone());
            }
            continue;
        }
        if o == b {
            // Ours didn't change; take theirs (including deletion).
            if let Some(content) = t {
                files.insert(path.clone(), content.clone());
            }
            continue;
        }
        if t == b {
            // Theirs didn't change; keep ours (including deletion).
            if let Some(content) = o {
                files.insert(path.clone(), content.clone());
            }
            continue;
        }

        let ours_text = o.cloned().unwrap_or_default();
        let theirs_text = t.cloned().unwrap_or_default();
        let marker = format!(
            "<<<<<<< HEAD\n{ours_text}\n=======\n{theirs_text}\n>>>>>>> {incoming_branch}"
        );
        files.insert(path.clone(), marker);
        conflicts.push(path.clone());
    }

    MergeOutcome { files, conflicts }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, parents: &[&str]) -> Commit {
        Commit {
            hash: hash.to_string(),
            message: hash.to_string(),
            parents: parents.iter().map(|s| s.to_string()).collect(),
            timestamp: 0,
            files: IndexMap::new(),
            lane: 0,
            branch: "main".to_string(),
        }
    }

    fn linear_dag() -> IndexMap<String, Commit> {
        let mut commits = IndexMap::new();
        commits.insert("a".to_string(), commit("a", &[]));
        commits.insert("b".to_string(), commit("b", &["a"]));
        commits.insert("c1".to_string(), commit("c1", &["b"]));
        commits.insert("c2".to_string(), commit("c2", &["b"]));
        commits
    }

    #[test]
    fn is_ancestor_reflexive_and_transitive() {
        let commits = linear_dag();
        assert!(is_ancestor(&commits, "a", "a"));
        assert!(is_ancestor(&commits, "a", "b"));
        assert!(is_ancestor(&commits, "a", "c1"));
        assert!(!is_ancestor(&commits, "c1", "c2"));
    }

    #[test]
    fn common_ancestor_of_diverged_branches() {
        let commits = linear_dag();
        assert_eq!(common_ancestor(&commits, "c1", "c2"), Some("b".to_string()));
    }

    #[test]
    fn three_way_merge_no_conflict_when_only_one_side_changed() {
        let mut base = IndexMap::new();
        base.insert("/f".to_string(), "1".to_string());
        let ours = base.clone();
        let mut theirs = IndexMap::new();
        theirs.insert("/f".to_string(), "2".to_string());

        let outcome = three_way_merge(&base, &ours, &theirs, "feature");
        assert!(outcome.conflicts.is_empty());
        assert_eq!(outcome.files["/f"], "2");
    }

    #[test]
    fn three_way_merge_conflict_when_both_sides_changed() {
        let mut base = IndexMap::new();
        base.insert("/config".to_string(), "blue".to_string());
        let mut ours = IndexMap::new();
        ours.insert("/config".to_string(), "red".to_string());
        let mut theirs = IndexMap::new();
        theirs.insert("/config".to_string(), "green".to_string());

        let outcome = three_way_merge(&base, &ours, &theirs, "feat");
        assert_eq!(outcome.conflicts, vec!["/config".to_string()]);
        let merged = &outcome.files["/config"];
        assert!(merged.starts_with("<<<<<<< HEAD\nred\n=======\ngreen\n>>>>>>> feat"));
    }

    #[test]
    fn three_way_merge_both_deleted_is_not_a_conflict() {
        let mut base = IndexMap::new();
        base.insert("/f".to_string(), "1".to_string());
        let ours = IndexMap::new();
        let theirs = IndexMap::new();

        let outcome = three_way_merge(&base, &ours, &theirs, "feature");
        assert!(outcome.conflicts.is_empty());
        assert!(!outcome.files.contains_key("/f"));
    }
}
