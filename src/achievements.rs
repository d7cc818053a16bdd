//! Badges: small, forward-compatible records of milestones reached,
//! updated from the repo's [`crate::repo::LastEvent`] and lesson
//! completions rather than polled.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::lesson::LessonEngine;
use crate::repo::LastEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDef {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub earned: bool,
    /// Unix seconds, set the moment `earned` flips to `true`.
    pub earned_at: Option<i64>,
}

pub fn default_badge_defs() -> Vec<BadgeDef> {
    vec![
        BadgeDef {
            id: "first-commit".to_string(),
            title: "First Commit".to_string(),
            description: "Made your first commit.".to_string(),
        },
        BadgeDef {
            id: "branch-builder".to_string(),
            title: "Branch Builder".to_string(),
            description: "Created a branch.".to_string(),
        },
        BadgeDef {
            id: "merge-master".to_string(),
            title: "Merge Master".to_string(),
            description: "Completed a merge.".to_string(),
        },
        BadgeDef {
            id: "conflict-resolver".to_string(),
            title: "Conflict Resolver".to_string(),
            description: "Resolved a merge conflict.".to_string(),
        },
        BadgeDef {
            id: "stash-stasher".to_string(),
            title: "Stash Stasher".to_string(),
            description: "Stashed and restored work in progress.".to_string(),
        },
        BadgeDef {
            id: "remote-runner".to_string(),
            title: "Remote Runner".to_string(),
            description: "Pushed to a remote.".to_string(),
        },
        BadgeDef {
            id: "lesson-graduate".to_string(),
            title: "Lesson Graduate".to_string(),
            description: "Completed every built-in lesson.".to_string(),
        },
    ]
}

/// Forward-compatible merge: add entries for any `BadgeDef` not already
/// tracked, leaving existing progress untouched. Safe to call every time
/// the badge defs might have grown since a save was last written.
pub fn merge_new_badges(badges: &mut IndexMap<String, Badge>, defs: &[BadgeDef]) {
    for def in defs {
        badges.entry(def.id.clone()).or_default();
    }
}

fn earn(badges: &mut IndexMap<String, Badge>, id: &str, now: i64) {
    let badge = badges.entry(id.to_string()).or_default();
    if !badge.earned {
        badge.earned = true;
        badge.earned_at = Some(now);
        log::info!("badge earned: {id}");
    }
}

/// React to the repo's most recent event, awarding any badge it unlocks.
pub fn sync_event(badges: &mut IndexMap<String, Badge>, event: &LastEvent, now: i64) {
    match event {
        LastEvent::Commit { resolved_conflict, .. } => {
            earn(badges, "first-commit", now);
            if *resolved_conflict {
                earn(badges, "conflict-resolver", now);
            }
        }
        LastEvent::Branch { .. } => earn(badges, "branch-builder", now),
        LastEvent::Merge { .. } => earn(badges, "merge-master", now),
        LastEvent::MergeConflict { .. } => {}
        LastEvent::Push { .. } => earn(badges, "remote-runner", now),
        LastEvent::Stash | LastEvent::StashPop => earn(badges, "stash-stasher", now),
        _ => {}
    }
}

/// Award "lesson-graduate" once every lesson the engine knows about is
/// complete.
pub fn sync_lessons(badges: &mut IndexMap<String, Badge>, engine: &LessonEngine, now: i64) {
    let all_complete = !engine.lessons.is_empty()
        && engine.lessons.iter().all(|l| engine.is_lesson_complete(&l.id));
    if all_complete {
        earn(badges, "lesson-graduate", now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_event_awards_first_commit_once() {
        let mut badges = IndexMap::new();
        sync_event(
            &mut badges,
            &LastEvent::Commit { hash: "a".to_string(), message: "m".to_string(), resolved_conflict: false },
            100,
        );
        assert!(badges["first-commit"].earned);
        assert_eq!(badges["first-commit"].earned_at, Some(100));
        assert!(!badges["conflict-resolver"].earned);

        sync_event(
            &mut badges,
            &LastEvent::Commit { hash: "b".to_string(), message: "m2".to_string(), resolved_conflict: false },
            200,
        );
        assert_eq!(badges["first-commit"].earned_at, Some(100), "must not re-stamp an earned badge");
    }

    #[test]
    fn sync_event_awards_conflict_resolver_only_when_the_commit_concludes_a_conflict() {
        let mut badges = IndexMap::new();
        sync_event(
            &mut badges,
            &LastEvent::Commit {
                hash: "c".to_string(),
                message: "Merge branch 'feature'".to_string(),
                resolved_conflict: true,
            },
            100,
        );
        assert!(badges["conflict-resolver"].earned);
        assert_eq!(badges["conflict-resolver"].earned_at, Some(100));
    }

    #[test]
    fn merge_new_badges_does_not_clobber_existing_progress() {
        let mut badges = IndexMap::new();
        earn(&mut badges, "first-commit", 1);
        merge_new_badges(&mut badges, &default_badge_defs());
        assert!(badges["first-commit"].earned);
        assert!(!badges["branch-builder"].earned);
    }

    #[test]
    fn sync_lessons_requires_every_lesson_complete() {
        let mut engine = LessonEngine::new(vec![]);
        let mut badges = IndexMap::new();
        sync_lessons(&mut badges, &engine, 1);
        assert!(!badges.contains_key("lesson-graduate"));

        engine.lessons.push(crate::lesson::Lesson {
            id: "x".to_string(),
            title: "X".to_string(),
            description: "".to_string(),
            steps: vec![crate::lesson::Step {
                id: "s".to_string(),
                prompt: "".to_string(),
                hint: None,
                setup: vec![],
                validator: crate::lesson::Validator::WorkingTreeClean,
            }],
        });
        sync_lessons(&mut badges, &engine, 1);
        assert!(!badges.contains_key("lesson-graduate"));

        engine.progress.insert(
            "x".to_string(),
            crate::lesson::LessonState { current_step: 1, completed: true },
        );
        sync_lessons(&mut badges, &engine, 1);
        assert!(badges["lesson-graduate"].earned);
    }
}
