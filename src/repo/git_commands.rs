//! The git subset: `init, status, add, commit, log, branch, checkout,
//! merge, remote, push, pull, clone, stash, reset --hard, revert`.
//!
//! Every handler here requires `initialized`, except `init` itself. All
//! mutation happens in a single assignment at the end of each function (or
//! not at all on the error path) so a failed command never leaves partial
//! state — `merge`'s conflict case is the one documented exception.

use indexmap::IndexMap;

use super::hash::{self, HashLookupError};
use super::merge;
use super::{CommandResult, Commit, IndexEntry, LastEvent, MergeState, Repo, StashEntry};
use crate::path;
use crate::remote::{RemoteRepo, RemoteStore};

fn short(hash: &str) -> &str {
    &hash[..hash.len().min(7)]
}

fn parse_message_flag(args: &[String]) -> Option<String> {
    args.iter()
        .position(|a| a == "-m")
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

fn describe_staged(state: &super::PathState) -> String {
    match state {
        super::PathState::New(p) => format!("new file:   {}", path::display(p)),
        super::PathState::Modified(p) => format!("modified:   {}", path::display(p)),
        super::PathState::Deleted(p) => format!("deleted:    {}", path::display(p)),
    }
}

fn describe_unstaged(state: &super::PathState) -> String {
    match state {
        super::PathState::New(p) | super::PathState::Modified(p) => {
            format!("modified:   {}", path::display(p))
        }
        super::PathState::Deleted(p) => format!("deleted:    {}", path::display(p)),
    }
}

impl Repo {
    fn sync_working_tree_to_head(&mut self) {
        let snapshot = self.head_snapshot();
        for path in snapshot.keys() {
            self.register_ancestor_dirs(path);
        }
        self.working_files = snapshot;
    }

    pub fn git_init(&mut self) -> CommandResult {
        self.initialized = true;
        self.ensure_branch("main", None);
        self.current_branch = "main".to_string();
        self.record_event(LastEvent::Init);
        CommandResult::ok(vec!["Initialized empty Git repository (simulated)".to_string()])
    }

    pub fn git_status(&self) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        let report = self.status();
        let mut lines = vec![format!("On branch {}", self.current_branch)];

        if !report.conflicts.is_empty() {
            lines.push("You have unmerged paths.".to_string());
            lines.push("Unmerged paths:".to_string());
            for p in &report.conflicts {
                lines.push(format!("  both modified:   {}", path::display(p)));
            }
        }
        if !report.staged.is_empty() {
            lines.push("Changes to be committed:".to_string());
            for s in &report.staged {
                lines.push(format!("  {}", describe_staged(s)));
            }
        }
        if !report.unstaged.is_empty() {
            lines.push("Changes not staged for commit:".to_string());
            for s in &report.unstaged {
                lines.push(format!("  {}", describe_unstaged(s)));
            }
        }
        if !report.untracked.is_empty() {
            lines.push("Untracked files:".to_string());
            for p in &report.untracked {
                lines.push(format!("  {}", path::display(p)));
            }
        }
        if !report.is_dirty() {
            lines.push("nothing to commit, working tree clean".to_string());
        }
        CommandResult::ok(lines)
    }

    pub fn git_add(&mut self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        if args.is_empty() {
            return CommandResult::usage("usage: git add <paths...>|.|-A");
        }

        let head_files = self.head_snapshot();
        let targets: Vec<String> = if args.iter().any(|a| a == "." || a == "-A") {
            let mut set: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
            set.extend(head_files.keys().cloned());
            set.extend(self.working_files.keys().cloned());
            set.into_iter().collect()
        } else {
            args.iter().map(|a| path::join(&self.cwd, a)).collect()
        };

        for target in &targets {
            if let Some(content) = self.working_files.get(target) {
                self.staged_files
                    .insert(target.clone(), IndexEntry::Present(content.clone()));
            } else if head_files.contains_key(target) {
                self.staged_files.insert(target.clone(), IndexEntry::Deleted);
            }
            if let Some(state) = &mut self.merge_state {
                state.conflicts.retain(|p| p != target);
            }
        }
        self.record_event(LastEvent::Add);
        CommandResult::ok_empty()
    }

    /// Shared by `git commit` and the no-conflict merge path, which commits
    /// immediately once `staged_files`/`merge_state` are set up.
    pub fn git_commit(&mut self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        if let Some(state) = &self.merge_state
            && !state.conflicts.is_empty()
        {
            return CommandResult::unresolved_merge();
        }
        if self.staged_files.is_empty() {
            return CommandResult::empty_commit();
        }

        let concluding_merge = self.merge_state.clone();
        let message = parse_message_flag(args).unwrap_or_else(|| match &concluding_merge {
            Some(state) => format!("Merge branch '{}'", state.incoming_branch),
            None => "Commit".to_string(),
        });

        let mut files = self.head_snapshot();
        for (path, entry) in &self.staged_files {
            match entry {
                IndexEntry::Present(content) => {
                    files.insert(path.clone(), content.clone());
                }
                IndexEntry::Deleted => {
                    files.shift_remove(path);
                }
            }
        }

        let mut parents = Vec::new();
        if let Some(head) = self.head() {
            parents.push(head.to_string());
        }
        if let Some(state) = &concluding_merge {
            parents.push(state.incoming_head.clone());
        }

        let timestamp = super::now_timestamp();
        let new_hash = hash::generate(&message, timestamp);
        let lane = self
            .branch_meta
            .get(&self.current_branch)
            .map(|m| m.lane)
            .unwrap_or(0);
        let commit = Commit {
            hash: new_hash.clone(),
            message: message.clone(),
            parents,
            timestamp,
            files: files.clone(),
            lane,
            branch: self.current_branch.clone(),
        };
        self.commits.insert(new_hash.clone(), commit);
        self.commit_order.push(new_hash.clone());

        let current_branch = self.current_branch.clone();
        self.branches.insert(current_branch, Some(new_hash.clone()));

        let staged_paths: Vec<String> = self.staged_files.keys().cloned().collect();
        for path in staged_paths {
            match files.get(&path) {
                Some(content) => {
                    self.register_ancestor_dirs(&path);
                    self.working_files.insert(path.clone(), content.clone());
                }
                None => {
                    self.working_files.shift_remove(&path);
                }
            }
        }

        self.staged_files.clear();
        self.merge_state = None;
        let resolved_conflict = concluding_merge.as_ref().is_some_and(|state| state.had_conflicts);
        self.record_event(LastEvent::Commit { hash: new_hash.clone(), message, resolved_conflict });
        CommandResult::ok(vec![format!(
            "[{} {}] committed",
            self.current_branch,
            short(&new_hash)
        )])
    }

    pub fn git_log(&self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        let oneline = args.iter().any(|a| a == "--oneline");
        let mut lines = Vec::new();
        let mut current = self.head().map(str::to_string);
        let mut visited = std::collections::HashSet::new();

        while let Some(hash) = current {
            if !visited.insert(hash.clone()) {
                break;
            }
            let Some(commit) = self.commits.get(&hash) else { break };
            if oneline {
                lines.push(format!("{} {}", short(&hash), commit.message));
            } else {
                lines.push(format!("commit {hash}"));
                lines.push(format!("Date:   {}", commit.timestamp));
                lines.push(String::new());
                lines.push(format!("    {}", commit.message));
                lines.push(String::new());
            }
            current = commit.parents.first().cloned();
        }
        CommandResult::ok(lines)
    }

    pub fn git_branch(&mut self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        match args.first() {
            None => {
                let mut names: Vec<&String> = self.branches.keys().collect();
                names.sort();
                let lines = names
                    .into_iter()
                    .map(|n| {
                        if *n == self.current_branch {
                            format!("* {n}")
                        } else {
                            format!("  {n}")
                        }
                    })
                    .collect();
                CommandResult::ok(lines)
            }
            Some(name) => {
                if self.branches.contains_key(name) {
                    return CommandResult::err_line(format!(
                        "fatal: A branch named '{name}' already exists."
                    ));
                }
                let head = self.head().map(str::to_string);
                self.ensure_branch(name, head);
                self.record_event(LastEvent::Branch { name: name.clone() });
                CommandResult::ok_empty()
            }
        }
    }

    pub fn git_checkout(&mut self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        let (create, name) = if args.first().map(String::as_str) == Some("-b") {
            (true, args.get(1))
        } else {
            (false, args.first())
        };
        let Some(name) = name else {
            return CommandResult::usage("usage: git checkout [-b] <branch>");
        };

        if self.is_dirty() {
            return CommandResult::dirty(
                "error: Your local changes would be overwritten by checkout (simulated)",
            );
        }

        if create {
            if self.branches.contains_key(name) {
                return CommandResult::err_line(format!(
                    "fatal: A branch named '{name}' already exists."
                ));
            }
            let head = self.head().map(str::to_string);
            self.ensure_branch(name, head);
        } else if !self.branches.contains_key(name) {
            return CommandResult::not_found(format!(
                "error: pathspec '{name}' did not match any file(s) known to git"
            ));
        }

        self.current_branch = name.clone();
        self.sync_working_tree_to_head();
        self.staged_files.clear();
        self.merge_state = None;
        self.record_event(LastEvent::Checkout { branch: name.clone() });
        CommandResult::ok(vec![format!("Switched to branch '{name}'")])
    }

    fn fast_forward(&mut self, target_hash: &str, branch: &str) -> CommandResult {
        let current_branch = self.current_branch.clone();
        self.branches.insert(current_branch, Some(target_hash.to_string()));
        self.sync_working_tree_to_head();
        self.staged_files.clear();
        self.merge_state = None;
        self.record_event(LastEvent::Merge { branch: branch.to_string() });
        CommandResult::ok(vec![format!("Fast-forward to {}", short(target_hash))])
    }

    pub fn git_merge(&mut self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        let Some(branch) = args.first() else {
            return CommandResult::usage("usage: git merge <branch>");
        };
        if !self.branches.contains_key(branch) {
            return CommandResult::not_found(format!("merge: {branch} - not something we can merge"));
        }
        if self.is_dirty() {
            return CommandResult::dirty(
                "error: Your local changes would be overwritten by merge (simulated)",
            );
        }

        let ours_head = self.head().map(str::to_string);
        let Some(theirs_head) = self.branches[branch].clone() else {
            return CommandResult::ok(vec!["Already up to date.".to_string()]);
        };
        let Some(ours_head) = ours_head else {
            return self.fast_forward(&theirs_head, branch);
        };

        if ours_head == theirs_head || merge::is_ancestor(&self.commits, &theirs_head, &ours_head) {
            return CommandResult::ok(vec!["Already up to date.".to_string()]);
        }
        if merge::is_ancestor(&self.commits, &ours_head, &theirs_head) {
            return self.fast_forward(&theirs_head, branch);
        }

        let base_hash = merge::common_ancestor(&self.commits, &ours_head, &theirs_head);
        let base_files = base_hash
            .as_deref()
            .and_then(|h| self.commits.get(h))
            .map(|c| c.files.clone())
            .unwrap_or_default();
        let ours_files = self.commits[&ours_head].files.clone();
        let theirs_files = self.commits[&theirs_head].files.clone();

        let outcome = merge::three_way_merge(&base_files, &ours_files, &theirs_files, branch);

        for path in outcome.files.keys() {
            self.register_ancestor_dirs(path);
        }
        self.working_files = outcome.files.clone();

        if outcome.conflicts.is_empty() {
            self.staged_files.clear();
            for (path, content) in &outcome.files {
                self.staged_files.insert(path.clone(), IndexEntry::Present(content.clone()));
            }
            for path in ours_files.keys() {
                if !outcome.files.contains_key(path) {
                    self.staged_files.insert(path.clone(), IndexEntry::Deleted);
                }
            }
            self.merge_state = Some(MergeState {
                incoming_branch: branch.clone(),
                incoming_head: theirs_head.clone(),
                conflicts: Vec::new(),
                had_conflicts: false,
            });
            self.git_commit(&[])
        } else {
            self.merge_state = Some(MergeState {
                incoming_branch: branch.clone(),
                incoming_head: theirs_head.clone(),
                conflicts: outcome.conflicts.clone(),
                had_conflicts: true,
            });
            self.record_event(LastEvent::MergeConflict {
                branch: branch.clone(),
                paths: outcome.conflicts.clone(),
            });
            let mut lines = vec![format!(
                "Auto-merging failed; fix conflicts and then commit the result (simulated)"
            )];
            lines.push("CONFLICT (content): Merge conflict in the following paths:".to_string());
            for p in &outcome.conflicts {
                lines.push(format!("  {}", path::display(p)));
            }
            CommandResult::err(1, lines)
        }
    }

    pub fn git_remote(&mut self, args: &[String], remotes: &mut RemoteStore) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        match args.first().map(String::as_str) {
            None => {
                let mut names: Vec<&String> = self.remotes.keys().collect();
                names.sort();
                CommandResult::ok(names.into_iter().cloned().collect())
            }
            Some("-v") => {
                let mut entries: Vec<(&String, &String)> = self.remotes.iter().collect();
                entries.sort_by_key(|(name, _)| name.clone());
                let mut lines = Vec::new();
                for (name, url) in entries {
                    lines.push(format!("{name}\t{url} (fetch)"));
                    lines.push(format!("{name}\t{url} (push)"));
                }
                CommandResult::ok(lines)
            }
            Some("add") => {
                let (Some(name), Some(url)) = (args.get(1), args.get(2)) else {
                    return CommandResult::usage("usage: git remote add <name> <url>");
                };
                if self.remotes.contains_key(name) {
                    return CommandResult::err_line(format!("fatal: remote {name} already exists."));
                }
                self.remotes.insert(name.clone(), url.clone());
                remotes.ensure_repo(url);
                CommandResult::ok_empty()
            }
            Some(other) => CommandResult::unimplemented(&format!("remote {other}")),
        }
    }

    pub fn git_push(&mut self, args: &[String], remotes: &mut RemoteStore) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        let set_upstream = args.iter().any(|a| a == "-u");
        let positional: Vec<&String> = args.iter().filter(|a| a.as_str() != "-u").collect();

        let branch = positional.get(1).map(|s| s.to_string()).unwrap_or_else(|| self.current_branch.clone());
        if !self.branches.contains_key(&branch) {
            return CommandResult::not_found(format!("error: src refspec {branch} does not match any"));
        }

        let remote_name = positional
            .first()
            .map(|s| s.to_string())
            .or_else(|| self.upstreams.get(&branch).map(|u| u.remote.clone()))
            .or_else(|| self.remotes.contains_key("origin").then(|| "origin".to_string()));
        let Some(remote_name) = remote_name else {
            return CommandResult::usage("fatal: No configured push destination.");
        };
        let Some(url) = self.remotes.get(&remote_name).cloned() else {
            return CommandResult::not_found(format!("fatal: '{remote_name}' does not appear to be a git repository"));
        };

        let Some(local_head) = self.branches[&branch].clone() else {
            return CommandResult::usage(format!("error: src refspec {branch} does not match any"));
        };

        let remote_repo = remotes.ensure_repo(&url);
        for hash in &self.commit_order {
            if !remote_repo.commits.contains_key(hash) {
                remote_repo.commits.insert(hash.clone(), self.commits[hash].clone());
                remote_repo.commit_order.push(hash.clone());
            }
        }
        let old_remote_head = remote_repo.branches.get(&branch).cloned().flatten();
        remote_repo.branches.insert(branch.clone(), Some(local_head.clone()));

        if set_upstream {
            self.upstreams.insert(
                branch.clone(),
                super::Upstream { remote: remote_name.clone(), branch: branch.clone() },
            );
        }
        self.record_event(LastEvent::Push { remote: remote_name.clone(), branch: branch.clone() });

        let range = match old_remote_head {
            Some(old) => format!("{}..{}", short(&old), short(&local_head)),
            None => format!("[new branch] {}", short(&local_head)),
        };
        CommandResult::ok(vec![format!("To {url}"), format!(" * {range}  {branch} -> {branch}")])
    }

    pub fn git_pull(&mut self, args: &[String], remotes: &mut RemoteStore) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        if self.is_dirty() {
            return CommandResult::dirty(
                "error: Your local changes would be overwritten by merge (simulated)",
            );
        }

        let remote_name = args
            .first()
            .map(|s| s.to_string())
            .or_else(|| self.upstreams.get(&self.current_branch).map(|u| u.remote.clone()))
            .or_else(|| self.remotes.contains_key("origin").then(|| "origin".to_string()));
        let Some(remote_name) = remote_name else {
            return CommandResult::usage("fatal: No configured pull source.");
        };
        let branch = args.get(1).cloned().unwrap_or_else(|| self.current_branch.clone());
        let Some(url) = self.remotes.get(&remote_name).cloned() else {
            return CommandResult::not_found(format!("fatal: '{remote_name}' does not appear to be a git repository"));
        };
        let Some(remote_repo) = remotes.get_repo(&url).cloned() else {
            return CommandResult::not_found(format!("fatal: '{remote_name}' does not appear to be a git repository"));
        };

        for hash in &remote_repo.commit_order {
            if !self.commits.contains_key(hash) {
                self.commits.insert(hash.clone(), remote_repo.commits[hash].clone());
                self.commit_order.push(hash.clone());
            }
        }

        let Some(remote_head) = remote_repo.branches.get(&branch).cloned().flatten() else {
            return CommandResult::ok(vec!["Already up to date.".to_string()]);
        };
        let local_head = self.head().map(str::to_string);

        self.record_event(LastEvent::Pull { remote: remote_name.clone(), branch: branch.clone() });

        match local_head {
            None => self.fast_forward(&remote_head, &branch),
            Some(local_head) if local_head == remote_head || merge::is_ancestor(&self.commits, &remote_head, &local_head) => {
                CommandResult::ok(vec!["Already up to date.".to_string()])
            }
            Some(local_head) if merge::is_ancestor(&self.commits, &local_head, &remote_head) => {
                self.fast_forward(&remote_head, &branch)
            }
            Some(_) => {
                let temp_branch = format!("__pull_tmp_{remote_head}__");
                self.branches.insert(temp_branch.clone(), Some(remote_head));
                let result = self.git_merge(&[temp_branch.clone()]);
                self.branches.shift_remove(&temp_branch);
                if let Some(state) = &mut self.merge_state
                    && state.incoming_branch == temp_branch
                {
                    state.incoming_branch = branch.clone();
                }
                result
            }
        }
    }

    pub fn git_clone(&mut self, url: &str, remotes: &mut RemoteStore) -> CommandResult {
        let remote_repo = remotes.ensure_repo(url).clone();

        *self = Repo::new();
        self.initialized = true;
        self.commits = remote_repo.commits;
        self.commit_order = remote_repo.commit_order;
        self.branches = remote_repo.branches;
        for name in self.branches.keys().cloned().collect::<Vec<_>>() {
            self.ensure_branch(&name, None);
        }
        self.current_branch = "main".to_string();
        self.remotes.insert("origin".to_string(), url.to_string());
        self.upstreams.insert(
            "main".to_string(),
            super::Upstream { remote: "origin".to_string(), branch: "main".to_string() },
        );
        self.sync_working_tree_to_head();
        self.record_event(LastEvent::Clone { url: url.to_string() });
        CommandResult::ok(vec![format!("Cloning into '{}'... (simulated)", url)])
    }

    pub fn git_stash(&mut self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        match args.first().map(String::as_str) {
            Some("pop") => {
                let Some(entry) = self.stash.first().cloned() else {
                    return CommandResult::err_line("No stash entries found.");
                };
                self.stash.remove(0);
                self.working_files = entry.working_files;
                for path in self.working_files.keys().cloned().collect::<Vec<_>>() {
                    self.register_ancestor_dirs(&path);
                }
                self.staged_files = entry.staged_files;
                self.record_event(LastEvent::StashPop);
                CommandResult::ok(vec!["Dropped stash".to_string()])
            }
            None => {
                if !self.is_dirty() {
                    return CommandResult::err_line("No local changes to save");
                }
                let entry = StashEntry {
                    working_files: self.working_files.clone(),
                    staged_files: self.staged_files.clone(),
                    message: format!("WIP on {}", self.current_branch),
                    timestamp: super::now_timestamp(),
                };
                self.stash.insert(0, entry);
                self.sync_working_tree_to_head();
                self.staged_files.clear();
                self.record_event(LastEvent::Stash);
                CommandResult::ok(vec![format!(
                    "Saved working directory and index state WIP on {}",
                    self.current_branch
                )])
            }
            Some(other) => CommandResult::unimplemented(&format!("stash {other}")),
        }
    }

    pub fn git_reset(&mut self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        if args.first().map(String::as_str) != Some("--hard") {
            return CommandResult::unimplemented("reset");
        }
        let target = args.get(1).map(String::as_str).unwrap_or("HEAD");

        let resolved = self.resolve_ref(target);
        let Some(target_hash) = resolved else {
            return CommandResult::not_found(format!("fatal: ambiguous argument '{target}': unknown revision"));
        };
        if !self.commits.contains_key(&target_hash) {
            return CommandResult::not_found(format!("fatal: unknown revision '{target}'"));
        }

        let current_branch = self.current_branch.clone();
        self.branches.insert(current_branch, Some(target_hash.clone()));
        self.sync_working_tree_to_head();
        self.staged_files.clear();
        self.merge_state = None;
        self.record_event(LastEvent::ResetHard { hash: target_hash.clone() });
        CommandResult::ok(vec![format!("HEAD is now at {}", short(&target_hash))])
    }

    /// Resolve `HEAD`, `HEAD~N`, or an unambiguous hash prefix.
    fn resolve_ref(&self, target: &str) -> Option<String> {
        if target == "HEAD" || target.starts_with("HEAD~") {
            let steps: usize = target
                .strip_prefix("HEAD~")
                .map(|n| n.parse().unwrap_or(0))
                .unwrap_or(0);
            let mut current = self.head().map(str::to_string)?;
            for _ in 0..steps {
                current = self.commits.get(&current)?.parents.first()?.clone();
            }
            return Some(current);
        }
        match hash::resolve_prefix(&self.commits, target) {
            Ok(hash) => Some(hash),
            Err(_) => None,
        }
    }

    pub fn git_revert(&mut self, args: &[String]) -> CommandResult {
        if !self.initialized {
            return CommandResult::not_a_repository();
        }
        let Some(target) = args.first() else {
            return CommandResult::usage("usage: git revert <hash>");
        };
        let resolved = match hash::resolve_prefix(&self.commits, target) {
            Ok(hash) => hash,
            Err(HashLookupError::Ambiguous) => {
                return CommandResult::ambiguous(format!("error: short commit id {target} is ambiguous"));
            }
            Err(HashLookupError::NotFound) => {
                return CommandResult::not_found(format!("fatal: bad revision '{target}'"));
            }
        };
        let Some(target_commit) = self.commits.get(&resolved).cloned() else {
            return CommandResult::not_found(format!("fatal: bad revision '{target}'"));
        };
        let parent_files = target_commit
            .parents
            .first()
            .and_then(|p| self.commits.get(p))
            .map(|c| c.files.clone())
            .unwrap_or_default();

        let mut result_files = self.head_snapshot();
        for (path, content) in &target_commit.files {
            match parent_files.get(path) {
                None => {
                    result_files.shift_remove(path);
                }
                Some(parent_content) if parent_content != content => {
                    result_files.insert(path.clone(), parent_content.clone());
                }
                _ => {}
            }
        }
        for (path, parent_content) in &parent_files {
            if !target_commit.files.contains_key(path) {
                result_files.insert(path.clone(), parent_content.clone());
            }
        }

        // Stage the full resulting working set, per the original's
        // simplification: a no-op delta is recorded for paths that
        // diverged from HEAD before the revert.
        let head_files = self.head_snapshot();
        self.staged_files.clear();
        for (path, content) in &result_files {
            self.staged_files.insert(path.clone(), IndexEntry::Present(content.clone()));
        }
        for path in head_files.keys() {
            if !result_files.contains_key(path) {
                self.staged_files.insert(path.clone(), IndexEntry::Deleted);
            }
        }

        for path in result_files.keys() {
            self.register_ancestor_dirs(path);
        }
        self.working_files = result_files;

        self.record_event(LastEvent::Revert { hash: resolved.clone() });
        let message = format!("Revert \"{}\"", target_commit.message);
        self.git_commit(&["-m".to_string(), message])
    }
}

#[allow(dead_code)]
fn seed_remote_repo() -> RemoteRepo {
    let mut commits = IndexMap::new();
    let mut commit_order = Vec::new();

    let mut readme_files = IndexMap::new();
    readme_files.insert("/README.md".to_string(), "# Project\n".to_string());
    let initial = Commit {
        hash: "f0a1b23".to_string(),
        message: "Initial commit".to_string(),
        parents: Vec::new(),
        timestamp: 0,
        files: readme_files.clone(),
        lane: 0,
        branch: "main".to_string(),
    };
    commits.insert(initial.hash.clone(), initial.clone());
    commit_order.push(initial.hash.clone());

    let mut contributing_files = readme_files;
    contributing_files.insert(
        "/CONTRIBUTING.md".to_string(),
        "# Contributing\n".to_string(),
    );
    let second = Commit {
        hash: "c0ffee1".to_string(),
        message: "Add contributing guide".to_string(),
        parents: vec![initial.hash.clone()],
        timestamp: 1,
        files: contributing_files,
        lane: 0,
        branch: "main".to_string(),
    };
    commits.insert(second.hash.clone(), second.clone());
    commit_order.push(second.hash.clone());

    let mut branches = IndexMap::new();
    branches.insert("main".to_string(), Some(second.hash));
    RemoteRepo { commits, commit_order, branches }
}

/// The URL lessons 5 and 6 clone from, pre-populated at startup with two
/// commits.
pub const SEED_REMOTE_URL: &str = "https://git-tutor.example/seed.git";

pub fn seed_remote_store(remotes: &mut RemoteStore) {
    remotes.seed(SEED_REMOTE_URL, seed_remote_repo());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized_repo() -> Repo {
        let mut repo = Repo::new();
        repo.git_init();
        repo
    }

    #[test]
    fn scenario_first_commit() {
        let mut repo = initialized_repo();
        crate::repo::shell::echo_redirect(&mut repo, "# X", "R");
        repo.git_add(&["R".to_string()]);
        let result = repo.git_commit(&["-m".to_string(), "a".to_string()]);
        assert!(result.ok);
        assert_eq!(repo.commits.len(), 1);
        let head = repo.head().unwrap().to_string();
        assert_eq!(repo.commits[&head].files["/R"], "# X");
        let log = repo.git_log(&["--oneline".to_string()]);
        assert_eq!(log.stdout.len(), 1);
        assert!(log.stdout[0].ends_with("a"));
    }

    #[test]
    fn scenario_merge_without_conflict() {
        let mut repo = initialized_repo();
        crate::repo::shell::echo_redirect(&mut repo, "1", "F");
        repo.git_add(&["F".to_string()]);
        repo.git_commit(&["-m".to_string(), "base".to_string()]);

        repo.git_branch(&["feat".to_string()]);
        repo.git_checkout(&["feat".to_string()]);
        crate::repo::shell::echo_redirect(&mut repo, "2", "F");
        repo.git_add(&["F".to_string()]);
        repo.git_commit(&["-m".to_string(), "feat change".to_string()]);

        repo.git_checkout(&["main".to_string()]);
        crate::repo::shell::echo_redirect(&mut repo, "3", "G");
        repo.git_add(&["G".to_string()]);
        repo.git_commit(&["-m".to_string(), "main change".to_string()]);

        let result = repo.git_merge(&["feat".to_string()]);
        assert!(result.ok, "{:?}", result);
        let head = repo.head().unwrap().to_string();
        assert_eq!(repo.commits[&head].parents.len(), 2);
        assert_eq!(repo.working_files["/F"], "2");
        assert_eq!(repo.working_files["/G"], "3");
    }

    #[test]
    fn scenario_merge_conflict_then_resolve() {
        let mut repo = initialized_repo();
        crate::repo::shell::echo_redirect(&mut repo, "blue", "config");
        repo.git_add(&["config".to_string()]);
        repo.git_commit(&["-m".to_string(), "base".to_string()]);

        repo.git_branch(&["feat".to_string()]);
        repo.git_checkout(&["feat".to_string()]);
        crate::repo::shell::echo_redirect(&mut repo, "green", "config");
        repo.git_add(&["config".to_string()]);
        repo.git_commit(&["-m".to_string(), "feat".to_string()]);

        repo.git_checkout(&["main".to_string()]);
        crate::repo::shell::echo_redirect(&mut repo, "red", "config");
        repo.git_add(&["config".to_string()]);
        repo.git_commit(&["-m".to_string(), "main".to_string()]);

        let result = repo.git_merge(&["feat".to_string()]);
        assert!(!result.ok);
        let state = repo.merge_state.clone().unwrap();
        assert_eq!(state.conflicts, vec!["/config".to_string()]);
        let buf = &repo.working_files["/config"];
        assert!(buf.contains("<<<<<<< HEAD"));
        assert!(buf.contains("red"));
        assert!(buf.contains("======="));
        assert!(buf.contains("green"));
        assert!(buf.contains(">>>>>>> feat"));

        crate::repo::shell::echo_redirect(&mut repo, "purple", "config");
        repo.git_add(&["config".to_string()]);
        let commit_result = repo.git_commit(&["-m".to_string(), "m".to_string()]);
        assert!(commit_result.ok);
        let head = repo.head().unwrap().to_string();
        assert_eq!(repo.commits[&head].parents.len(), 2);
        assert!(repo.merge_state.is_none());
        assert_eq!(
            repo.last_event,
            Some(LastEvent::Commit {
                hash: head,
                message: "m".to_string(),
                resolved_conflict: true,
            })
        );
    }

    #[test]
    fn scenario_stash_round_trip() {
        let mut repo = initialized_repo();
        crate::repo::shell::echo_redirect(&mut repo, "base", "F");
        repo.git_add(&["F".to_string()]);
        repo.git_commit(&["-m".to_string(), "base".to_string()]);

        crate::repo::shell::touch(&mut repo, &["N".to_string()]);
        let stash_result = repo.git_stash(&[]);
        assert!(stash_result.ok);
        assert!(!repo.is_dirty());
        assert_eq!(repo.stash.len(), 1);

        let pop_result = repo.git_stash(&["pop".to_string()]);
        assert!(pop_result.ok);
        assert!(repo.working_files.contains_key("/N"));
        assert!(repo.stash.is_empty());
    }

    #[test]
    fn scenario_reset_hard() {
        let mut repo = initialized_repo();
        crate::repo::shell::echo_redirect(&mut repo, "1", "F");
        repo.git_add(&["F".to_string()]);
        repo.git_commit(&["-m".to_string(), "first".to_string()]);
        let first_hash = repo.head().unwrap().to_string();

        crate::repo::shell::echo_redirect(&mut repo, "2", "F");
        repo.git_add(&["F".to_string()]);
        repo.git_commit(&["-m".to_string(), "second".to_string()]);

        let result = repo.git_reset(&["--hard".to_string(), "HEAD~1".to_string()]);
        assert!(result.ok);
        assert_eq!(repo.head().unwrap(), first_hash);
        assert_eq!(repo.working_files["/F"], "1");
        assert!(repo.staged_files.is_empty());
        assert_eq!(repo.commits.len(), 2);
    }

    #[test]
    fn scenario_push_pull_divergence() {
        let mut repo = initialized_repo();
        let mut remotes = RemoteStore::new();
        seed_remote_store(&mut remotes);

        repo.git_clone(SEED_REMOTE_URL, &mut remotes);
        assert_eq!(repo.commits.len(), 2);

        crate::repo::shell::echo_redirect(&mut repo, "mine", "local.txt");
        repo.git_add(&["local.txt".to_string()]);
        repo.git_commit(&["-m".to_string(), "local change".to_string()]);
        assert_eq!(repo.commits.len(), 3);

        let push_result = repo.git_push(&["-u".to_string(), "origin".to_string(), "main".to_string()], &mut remotes);
        assert!(push_result.ok, "{:?}", push_result);
        assert_eq!(
            remotes.get_repo(SEED_REMOTE_URL).unwrap().branches["main"],
            repo.branches["main"]
        );

        // Simulate a teammate commit landing on the remote directly.
        {
            let remote_repo = remotes.ensure_repo(SEED_REMOTE_URL);
            let parent = remote_repo.branches["main"].clone().unwrap();
            let mut files = remote_repo.commits[&parent].files.clone();
            files.insert("/teammate.txt".to_string(), "hi".to_string());
            let teammate_commit = Commit {
                hash: "d00dfee".to_string(),
                message: "teammate commit".to_string(),
                parents: vec![parent],
                timestamp: 2,
                files,
                lane: 0,
                branch: "main".to_string(),
            };
            remote_repo.commits.insert(teammate_commit.hash.clone(), teammate_commit.clone());
            remote_repo.commit_order.push(teammate_commit.hash.clone());
            remote_repo.branches.insert("main".to_string(), Some(teammate_commit.hash));
        }

        let pull_result = repo.git_pull(&[], &mut remotes);
        assert!(pull_result.ok, "{:?}", pull_result);
        assert_eq!(repo.commits.len(), 4);
        assert_eq!(repo.working_files["/teammate.txt"], "hi");
    }
}
