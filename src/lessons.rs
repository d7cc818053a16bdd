//! The built-in lesson set.
//!
//! Each step's `setup` is a list of command lines replayed through
//! [`crate::dispatcher::dispatch`] rather than a closure, so lessons stay
//! plain data and serialize with everything else `AppState` carries.

use crate::lesson::{Lesson, Step, Validator};
use crate::repo::git_commands::SEED_REMOTE_URL;

fn step(id: &str, prompt: &str, hint: Option<&str>, setup: &[&str], validator: Validator) -> Step {
    Step {
        id: id.to_string(),
        prompt: prompt.to_string(),
        hint: hint.map(str::to_string),
        setup: setup.iter().map(|s| s.to_string()).collect(),
        validator,
    }
}

pub fn default_lessons() -> Vec<Lesson> {
    vec![
        lesson_first_commit(),
        lesson_branching(),
        lesson_merge_conflict(),
        lesson_stash(),
        lesson_remote_push(),
        lesson_remote_pull(),
    ]
}

fn lesson_first_commit() -> Lesson {
    Lesson {
        id: "first-commit".to_string(),
        title: "Your First Commit".to_string(),
        description: "Initialize a repository, stage a file, and commit it.".to_string(),
        steps: vec![
            step(
                "init",
                "Initialize a new repository with `git init`.",
                Some("git init"),
                &[],
                Validator::CurrentBranchIs { name: "main".to_string() },
            ),
            step(
                "write-readme",
                r#"Create a README: echo "# My Project" > README.md"#,
                Some(r#"echo "# My Project" > README.md"#),
                &["git init"],
                Validator::FileContains {
                    path: "/README.md".to_string(),
                    substring: "My Project".to_string(),
                },
            ),
            step(
                "stage-and-commit",
                "Stage and commit the README with `git add .` then `git commit -m \"...\"`.",
                Some("git add . && git commit -m \"Initial commit\""),
                &["git init", r#"echo "# My Project" > README.md"#],
                Validator::CommitCountAtLeast { count: 1 },
            ),
        ],
    }
}

fn lesson_branching() -> Lesson {
    Lesson {
        id: "branching".to_string(),
        title: "Branching".to_string(),
        description: "Create a feature branch and commit on it independently of main.".to_string(),
        steps: vec![
            step(
                "create-branch",
                "Create a new branch called `feature` with `git branch feature`.",
                Some("git branch feature"),
                &["git init", r#"echo "1" > F"#, "git add .", "git commit -m base"],
                Validator::BranchExists { name: "feature".to_string() },
            ),
            step(
                "switch-and-commit",
                "Switch to `feature` with `git checkout feature`, then make a commit.",
                Some(r#"git checkout feature && echo "2" > F && git add . && git commit -m feature"#),
                &[
                    "git init",
                    r#"echo "1" > F"#,
                    "git add .",
                    "git commit -m base",
                    "git branch feature",
                ],
                Validator::CommitCountAtLeast { count: 2 },
            ),
        ],
    }
}

fn lesson_merge_conflict() -> Lesson {
    let setup_through_divergence = [
        "git init",
        r#"echo "blue" > config"#,
        "git add .",
        "git commit -m base",
        "git branch feature",
        "git checkout feature",
        r#"echo "green" > config"#,
        "git add .",
        "git commit -m feature-change",
        "git checkout main",
        r#"echo "red" > config"#,
        "git add .",
        "git commit -m main-change",
    ];
    Lesson {
        id: "merge-conflict".to_string(),
        title: "Resolving a Merge Conflict".to_string(),
        description: "Merge two branches that edited the same file and resolve the conflict."
            .to_string(),
        steps: vec![
            step(
                "merge",
                "Merge `feature` into `main` with `git merge feature`.",
                Some("git merge feature"),
                &setup_through_divergence,
                Validator::FileContains {
                    path: "/config".to_string(),
                    substring: "<<<<<<< HEAD".to_string(),
                },
            ),
            step(
                "resolve",
                "Edit `config` to remove the conflict markers, then `git add config` and commit.",
                Some(r#"echo "merged" > config && git add config && git commit -m "Merge branch 'feature'""#),
                &[],
                Validator::WorkingTreeClean,
            ),
        ],
    }
}

fn lesson_stash() -> Lesson {
    Lesson {
        id: "stash".to_string(),
        title: "Stashing Work in Progress".to_string(),
        description: "Stash an uncommitted change, confirm the tree is clean, then bring it back."
            .to_string(),
        steps: vec![
            step(
                "stash-push",
                "Stash your uncommitted change with `git stash`.",
                Some("git stash"),
                &["git init", r#"echo "1" > F"#, "git add .", "git commit -m base", "touch N"],
                Validator::WorkingTreeClean,
            ),
            step(
                "stash-pop",
                "Bring your change back with `git stash pop`.",
                Some("git stash pop"),
                &[],
                Validator::MatchesCheckpoint,
            ),
        ],
    }
}

fn lesson_remote_push() -> Lesson {
    Lesson {
        id: "remote-push".to_string(),
        title: "Pushing to a Remote".to_string(),
        description: "Clone the tutorial's seed remote, commit locally, and push it back."
            .to_string(),
        steps: vec![
            step(
                "clone",
                &format!("Clone the seed remote with `git clone {SEED_REMOTE_URL}`."),
                Some("git clone"),
                &[&format!("git clone {SEED_REMOTE_URL}")],
                Validator::RemoteExists { name: "origin".to_string() },
            ),
            step(
                "push",
                "Commit a new file and push it with `git push -u origin main`.",
                Some(r#"echo "hi" > notes.txt && git add . && git commit -m notes && git push -u origin main"#),
                &[],
                Validator::RemoteHeadMatchesLocal {
                    remote: "origin".to_string(),
                    branch: "main".to_string(),
                },
            ),
        ],
    }
}

fn lesson_remote_pull() -> Lesson {
    Lesson {
        id: "remote-pull".to_string(),
        title: "Pulling Remote Changes".to_string(),
        description: "Pull in commits a teammate pushed to the remote ahead of you.".to_string(),
        steps: vec![step(
            "pull",
            "Fetch and merge the remote's new commits with `git pull`.",
            Some("git pull"),
            &[&format!("git clone {SEED_REMOTE_URL}")],
            Validator::RemoteHeadMatchesLocal {
                remote: "origin".to_string(),
                branch: "main".to_string(),
            },
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lessons_have_unique_ids_and_at_least_one_step_each() {
        let lessons = default_lessons();
        assert!(lessons.len() >= 6);
        let mut ids: Vec<&str> = lessons.iter().map(|l| l.id.as_str()).collect();
        ids.sort();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped, "lesson ids must be unique");
        for lesson in &lessons {
            assert!(!lesson.steps.is_empty(), "{} has no steps", lesson.id);
        }
    }
}
