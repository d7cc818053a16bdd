//! The lesson engine: scripted setup, a declarative validator per step, and
//! a checkpoint so a learner can retry a step from its starting state.
//!
//! Validators are data, not closures — [`Validator`] is a small enum of
//! checks evaluated against a [`Repo`] snapshot, which keeps [`Lesson`] and
//! [`Step`] plain `Serialize`/`Deserialize` data like everything else that
//! crosses the persistence boundary.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dispatcher::dispatch;
use crate::remote::RemoteStore;
use crate::repo::Repo;

/// A declarative check against the current repo state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Validator {
    BranchExists { name: String },
    CurrentBranchIs { name: String },
    FileContains { path: String, substring: String },
    CommitCountAtLeast { count: usize },
    HeadMessageEquals { message: String },
    WorkingTreeClean,
    RemoteExists { name: String },
    RemoteHeadMatchesLocal { remote: String, branch: String },
    /// Passes once the repo's current render snapshot, serialized to JSON,
    /// round-trips back to whatever it was at the step's checkpoint — used
    /// by the stash lesson to confirm the working tree came back unchanged.
    MatchesCheckpoint,
}

impl Validator {
    fn check(&self, repo: &Repo, remotes: &RemoteStore, checkpoint: Option<&Repo>) -> bool {
        match self {
            Validator::BranchExists { name } => repo.branches.contains_key(name),
            Validator::CurrentBranchIs { name } => &repo.current_branch == name,
            Validator::FileContains { path, substring } => repo
                .working_files
                .get(path)
                .is_some_and(|content| content.contains(substring.as_str())),
            Validator::CommitCountAtLeast { count } => repo.commits.len() >= *count,
            Validator::HeadMessageEquals { message } => repo
                .head()
                .and_then(|h| repo.commits.get(h))
                .is_some_and(|c| &c.message == message),
            Validator::WorkingTreeClean => !repo.is_dirty(),
            Validator::RemoteExists { name } => repo.remotes.contains_key(name),
            Validator::RemoteHeadMatchesLocal { remote, branch } => {
                let Some(url) = repo.remotes.get(remote) else { return false };
                let Some(remote_repo) = remotes.get_repo(url) else { return false };
                remote_repo.branches.get(branch) == repo.branches.get(branch)
            }
            Validator::MatchesCheckpoint => checkpoint.is_some_and(|snap| {
                serde_json::to_string(&snap.snapshot()).ok()
                    == serde_json::to_string(&repo.snapshot()).ok()
            }),
        }
    }
}

/// One step within a lesson: a prompt, the commands that seed its starting
/// state, and the check that marks it complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub prompt: String,
    pub hint: Option<String>,
    /// Command lines run through [`dispatch`] to reach this step's starting
    /// state, applied once when the step becomes current.
    pub setup: Vec<String>,
    pub validator: Validator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub steps: Vec<Step>,
}

/// Per-lesson progress, persisted alongside the repo and badges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LessonState {
    pub current_step: usize,
    pub completed: bool,
}

pub type CheckpointMap = IndexMap<String, Repo>;

/// Drives a fixed set of [`Lesson`]s against a [`Repo`]: runs each step's
/// setup once, checks its validator, and advances when satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonEngine {
    pub lessons: Vec<Lesson>,
    pub active_lesson_id: Option<String>,
    pub progress: IndexMap<String, LessonState>,
    /// Snapshot of the repo taken when each lesson's current step began,
    /// restored by [`LessonEngine::reset_step`].
    pub checkpoints: CheckpointMap,
}

impl LessonEngine {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        LessonEngine {
            lessons,
            active_lesson_id: None,
            progress: IndexMap::new(),
            checkpoints: CheckpointMap::new(),
        }
    }

    fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    /// Begin (or resume) a lesson: seeds `repo` with the current step's
    /// setup commands and records a checkpoint to restore on retry.
    pub fn start(&mut self, lesson_id: &str, repo: &mut Repo, remotes: &mut RemoteStore) {
        self.active_lesson_id = Some(lesson_id.to_string());
        let state = self.progress.entry(lesson_id.to_string()).or_default();
        let step_index = state.current_step;

        let Some(lesson) = self.lesson(lesson_id) else {
            log::warn!("start: unknown lesson {lesson_id}");
            return;
        };
        let Some(step) = lesson.steps.get(step_index) else {
            return;
        };
        for command in &step.setup {
            dispatch(command, repo, remotes);
        }
        self.checkpoints.insert(lesson_id.to_string(), repo.clone());
    }

    /// Re-run the current step's checkpoint, discarding any changes the
    /// learner made while attempting it.
    pub fn reset_step(&self, lesson_id: &str, repo: &mut Repo) {
        if let Some(checkpoint) = self.checkpoints.get(lesson_id) {
            *repo = checkpoint.clone();
        }
    }

    /// Evaluate the active lesson's current step's validator against
    /// `repo`. Returns `true` exactly once per step, the moment it's
    /// satisfied, and advances `progress` when it is.
    pub fn check_current_step(&mut self, repo: &Repo, remotes: &RemoteStore) -> bool {
        let Some(lesson_id) = self.active_lesson_id.clone() else { return false };
        let Some(lesson) = self.lesson(&lesson_id) else { return false };
        let state = self.progress.entry(lesson_id.clone()).or_default();
        if state.completed {
            return false;
        }
        let Some(step) = lesson.steps.get(state.current_step) else { return false };
        let checkpoint = self.checkpoints.get(&lesson_id);
        if !step.validator.check(repo, remotes, checkpoint) {
            return false;
        }

        let total_steps = lesson.steps.len();
        let state = self.progress.get_mut(&lesson_id).expect("inserted above");
        state.current_step += 1;
        if state.current_step >= total_steps {
            state.completed = true;
        }
        true
    }

    pub fn is_lesson_complete(&self, lesson_id: &str) -> bool {
        self.progress.get(lesson_id).is_some_and(|s| s.completed)
    }

    pub fn current_step(&self, lesson_id: &str) -> Option<&Step> {
        let state = self.progress.get(lesson_id)?;
        self.lesson(lesson_id)?.steps.get(state.current_step)
    }
}
