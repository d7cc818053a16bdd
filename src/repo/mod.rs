//! The simulated repository: working tree, index, commit DAG, branches,
//! merge/stash/reset/revert.
//!
//! This is the ~55%-share core of the engine. Git-subcommand handlers live in
//! [`git_commands`]; the shell subset lives in [`shell`]; the three-way
//! merge and ancestor search are pure functions in [`merge`]; hash
//! generation and unambiguous-prefix lookup live in [`hash`].

pub mod git_commands;
pub mod hash;
pub mod merge;
pub mod shell;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Wall-clock seconds, used to stamp commits and stash entries.
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// A staged entry: either the content that will be committed, or a sentinel
/// marking that the path is staged for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content")]
pub enum IndexEntry {
    Present(String),
    Deleted,
}

/// An immutable commit. Commits are never mutated once created; they become
/// unreachable (but not deleted) after `reset --hard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub parents: Vec<String>,
    pub timestamp: i64,
    pub files: IndexMap<String, String>,
    pub lane: u32,
    pub branch: String,
}

/// Draw metadata allocated the first time a branch name appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchMeta {
    pub lane: u32,
    pub color: String,
}

/// Palette cycled through as new branches are created, matching the small
/// fixed palette a graph-drawing UI would use.
const LANE_COLORS: &[&str] = &[
    "#4c9aff", "#36b37e", "#ff8b00", "#ff5630", "#6554c0", "#00b8d9", "#ffab00", "#6b778c",
];

/// State of an in-progress merge. Non-`None` iff a merge has started but not
/// yet been committed; `commit` is forbidden while `conflicts` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeState {
    pub incoming_branch: String,
    pub incoming_head: String,
    pub conflicts: Vec<String>,
    /// Set once this merge ever recorded a conflict, even after `git add`
    /// resolves the last path and empties `conflicts`. Lets the concluding
    /// commit distinguish a conflict resolution from a clean auto-merge.
    pub had_conflicts: bool,
}

/// A single stash entry: a full snapshot of working tree and index at the
/// time of stashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StashEntry {
    pub working_files: IndexMap<String, String>,
    pub staged_files: IndexMap<String, IndexEntry>,
    pub message: String,
    pub timestamp: i64,
}

/// A recorded default (remote, remote-branch) for a local branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    pub remote: String,
    pub branch: String,
}

/// Sum type describing the most recent state-changing operation, replacing
/// a loose string tag. The achievement engine pattern-matches on this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::Display)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LastEvent {
    Init,
    Add,
    #[strum(to_string = "commit {hash} \"{message}\"")]
    Commit {
        hash: String,
        message: String,
        /// True when this commit concludes a merge that had recorded at
        /// least one conflict along the way.
        #[serde(default)]
        resolved_conflict: bool,
    },
    #[strum(to_string = "branch {name}")]
    Branch { name: String },
    #[strum(to_string = "checkout {branch}")]
    Checkout { branch: String },
    #[strum(to_string = "merge {branch}")]
    Merge { branch: String },
    #[strum(to_string = "merge {branch} (conflicts: {paths:?})")]
    MergeConflict { branch: String, paths: Vec<String> },
    #[strum(to_string = "push {branch} -> {remote}")]
    Push { remote: String, branch: String },
    #[strum(to_string = "pull {branch} <- {remote}")]
    Pull { remote: String, branch: String },
    #[strum(to_string = "clone {url}")]
    Clone { url: String },
    #[strum(to_string = "reset --hard {hash}")]
    ResetHard { hash: String },
    #[strum(to_string = "revert {hash}")]
    Revert { hash: String },
    Stash,
    StashPop,
    #[strum(to_string = "write {path}")]
    FsWrite { path: String },
    #[strum(to_string = "touch {path}")]
    FsTouch { path: String },
    #[strum(to_string = "rm {path}")]
    FsRm { path: String },
    #[strum(to_string = "mkdir {path}")]
    FsMkdir { path: String },
    #[strum(to_string = "edit {path}")]
    FsEdit { path: String },
}

/// Derived status, split into the three disjoint sets from the command
/// contract plus the merge-conflict paths (excluded from the other three).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathState {
    New(String),
    Modified(String),
    Deleted(String),
}

impl PathState {
    pub fn path(&self) -> &str {
        match self {
            PathState::New(p) | PathState::Modified(p) | PathState::Deleted(p) => p,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub staged: Vec<PathState>,
    pub unstaged: Vec<PathState>,
    pub untracked: Vec<String>,
    pub conflicts: Vec<String>,
}

impl StatusReport {
    pub fn is_dirty(&self) -> bool {
        !self.staged.is_empty()
            || !self.unstaged.is_empty()
            || !self.untracked.is_empty()
            || !self.conflicts.is_empty()
    }
}

/// The structured result every command produces: a tagged record rather
/// than an open map. `stdout`/`stderr` are line vectors — no entry contains
/// an embedded newline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub ok: bool,
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandResult {
    pub fn ok(stdout: Vec<String>) -> Self {
        CommandResult { ok: true, exit_code: 0, stdout, stderr: Vec::new() }
    }

    pub fn ok_empty() -> Self {
        Self::ok(Vec::new())
    }

    pub fn err(code: i32, stderr: Vec<String>) -> Self {
        CommandResult { ok: false, exit_code: code, stdout: Vec::new(), stderr }
    }

    pub fn err_line(line: impl Into<String>) -> Self {
        Self::err(1, vec![line.into()])
    }

    pub fn not_a_repository() -> Self {
        Self::err_line("fatal: not a git repository (simulated)")
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::err_line(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::err_line(message.into())
    }

    pub fn ambiguous(message: impl Into<String>) -> Self {
        Self::err_line(message.into())
    }

    pub fn dirty(message: impl Into<String>) -> Self {
        Self::err(
            1,
            vec![
                message.into(),
                "hint: commit your changes or stash them before you proceed (simulated)"
                    .to_string(),
            ],
        )
    }

    pub fn empty_commit() -> Self {
        Self::err_line(
            "nothing to commit, working tree clean (use \"git add\" to track files) (simulated)",
        )
    }

    pub fn unresolved_merge() -> Self {
        Self::err_line(
            "error: Committing is not possible because you have unmerged paths (simulated)",
        )
    }

    pub fn unimplemented(command: &str) -> Self {
        Self::err_line(format!("'{command}' is not implemented in this tutorial."))
    }

    pub fn unknown_command(command: &str) -> Self {
        Self::err(127, vec![format!("{command}: command not found")])
    }
}

/// The simulated repository. Owns every piece of state named in the data
/// model: the virtual filesystem, index, commit DAG, branches, HEAD, any
/// in-progress merge, and the stash stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    pub initialized: bool,
    pub cwd: String,
    pub working_files: IndexMap<String, String>,
    pub directories: IndexSet<String>,
    pub staged_files: IndexMap<String, IndexEntry>,
    pub commits: IndexMap<String, Commit>,
    pub commit_order: Vec<String>,
    pub branches: IndexMap<String, Option<String>>,
    pub branch_meta: IndexMap<String, BranchMeta>,
    pub current_branch: String,
    pub merge_state: Option<MergeState>,
    pub stash: Vec<StashEntry>,
    pub remotes: IndexMap<String, String>,
    pub upstreams: IndexMap<String, Upstream>,
    pub last_event: Option<LastEvent>,
}

impl Default for Repo {
    fn default() -> Self {
        let mut branches = IndexMap::new();
        branches.insert("main".to_string(), None);
        let mut branch_meta = IndexMap::new();
        branch_meta.insert("main".to_string(), BranchMeta { lane: 0, color: LANE_COLORS[0].to_string() });

        Repo {
            initialized: false,
            cwd: "/".to_string(),
            working_files: IndexMap::new(),
            directories: IndexSet::new(),
            staged_files: IndexMap::new(),
            commits: IndexMap::new(),
            commit_order: Vec::new(),
            branches,
            branch_meta,
            current_branch: "main".to_string(),
            merge_state: None,
            stash: Vec::new(),
            remotes: IndexMap::new(),
            upstreams: IndexMap::new(),
            last_event: None,
        }
    }
}

/// Borrowed view of exactly the fields the external UI consumes, per the
/// render-snapshot contract. Excludes `directories`, `stash`, and
/// `upstreams`, which are internal bookkeeping the UI doesn't render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot<'a> {
    pub initialized: bool,
    pub current_branch: &'a str,
    pub cwd: &'a str,
    pub staged_files: &'a IndexMap<String, IndexEntry>,
    pub working_files: &'a IndexMap<String, String>,
    pub commits: &'a IndexMap<String, Commit>,
    pub commit_order: &'a [String],
    pub branches: &'a IndexMap<String, Option<String>>,
    pub branch_meta: &'a IndexMap<String, BranchMeta>,
    pub merge_state: &'a Option<MergeState>,
    pub remotes: &'a IndexMap<String, String>,
    pub last_event: &'a Option<LastEvent>,
}

impl Repo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the most recent state-changing operation, logging it via
    /// its `strum::Display` rendering.
    pub(crate) fn record_event(&mut self, event: LastEvent) {
        log::debug!("event: {event}");
        self.last_event = Some(event);
    }

    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            initialized: self.initialized,
            current_branch: &self.current_branch,
            cwd: &self.cwd,
            staged_files: &self.staged_files,
            working_files: &self.working_files,
            commits: &self.commits,
            commit_order: &self.commit_order,
            branches: &self.branches,
            branch_meta: &self.branch_meta,
            merge_state: &self.merge_state,
            remotes: &self.remotes,
            last_event: &self.last_event,
        }
    }

    /// The current branch's head hash, if born.
    pub fn head(&self) -> Option<&str> {
        self.branches.get(&self.current_branch)?.as_deref()
    }

    /// The file snapshot at HEAD, or empty if HEAD is unborn.
    pub fn head_snapshot(&self) -> IndexMap<String, String> {
        self.head()
            .and_then(|h| self.commits.get(h))
            .map(|c| c.files.clone())
            .unwrap_or_default()
    }

    /// Ensure a branch name exists in `branches`/`branch_meta`, allocating
    /// the next lane and color on first appearance.
    pub fn ensure_branch(&mut self, name: &str, head: Option<String>) {
        if !self.branches.contains_key(name) {
            self.branches.insert(name.to_string(), head);
        }
        if !self.branch_meta.contains_key(name) {
            let lane = self.branch_meta.len() as u32;
            let color = LANE_COLORS[lane as usize % LANE_COLORS.len()].to_string();
            self.branch_meta.insert(name.to_string(), BranchMeta { lane, color });
        }
    }

    /// Register `path` and every ancestor directory as known directories.
    pub fn register_ancestor_dirs(&mut self, path: &str) {
        let mut dir = crate::path::dirname(path);
        loop {
            let inserted = self.directories.insert(dir.clone());
            if dir == "/" || !inserted {
                break;
            }
            dir = crate::path::dirname(&dir);
        }
        self.directories.insert("/".to_string());
    }

    pub fn status(&self) -> StatusReport {
        let head_files = self.head_snapshot();
        let conflicts = self
            .merge_state
            .as_ref()
            .map(|m| m.conflicts.clone())
            .unwrap_or_default();
        let conflict_set: std::collections::HashSet<&str> =
            conflicts.iter().map(String::as_str).collect();

        let mut staged = Vec::new();
        for (path, entry) in &self.staged_files {
            if conflict_set.contains(path.as_str()) {
                continue;
            }
            match entry {
                IndexEntry::Present(content) => match head_files.get(path) {
                    None => staged.push(PathState::New(path.clone())),
                    Some(h) if h != content => staged.push(PathState::Modified(path.clone())),
                    _ => {}
                },
                IndexEntry::Deleted => {
                    if head_files.contains_key(path) {
                        staged.push(PathState::Deleted(path.clone()));
                    }
                }
            }
        }

        let mut unstaged = Vec::new();
        let mut untracked = Vec::new();
        let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
        for path in self
            .working_files
            .keys()
            .chain(head_files.keys())
            .chain(self.staged_files.keys())
        {
            if !seen.insert(path.as_str()) {
                continue;
            }
            if conflict_set.contains(path.as_str()) {
                continue;
            }

            let baseline: Option<&String> = match self.staged_files.get(path) {
                Some(IndexEntry::Present(c)) => Some(c),
                Some(IndexEntry::Deleted) => None,
                None => head_files.get(path),
            };
            let tracked = head_files.contains_key(path) || self.staged_files.contains_key(path);
            let working = self.working_files.get(path);

            match (baseline, working) {
                (Some(b), Some(w)) if b != w => unstaged.push(PathState::Modified(path.clone())),
                (Some(_), None) => unstaged.push(PathState::Deleted(path.clone())),
                (None, Some(_)) if !tracked => untracked.push(path.clone()),
                (None, Some(_)) => unstaged.push(PathState::Modified(path.clone())),
                _ => {}
            }
        }

        staged.sort_by(|a, b| a.path().cmp(b.path()));
        unstaged.sort_by(|a, b| a.path().cmp(b.path()));
        untracked.sort();

        StatusReport { staged, unstaged, untracked, conflicts }
    }

    pub fn is_dirty(&self) -> bool {
        self.status().is_dirty()
    }

    /// The external editor's write hook: `edit <path>` is routed by the UI,
    /// not the dispatcher, but the buffer mutation it performs is part of
    /// the command interface.
    pub fn apply_external_edit(&mut self, path: &str, contents: String) {
        let path = crate::path::normalize(path);
        self.register_ancestor_dirs(&path);
        self.working_files.insert(path.clone(), contents);
        self.record_event(LastEvent::FsEdit { path });
    }
}
