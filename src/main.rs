//! `git-tutor`: a line-oriented REPL over the simulated engine.
//!
//! Reads commands from stdin, dispatches them against an in-memory
//! [`Repo`], and prints the resulting stdout/stderr lines. `--save`/`--load`
//! persist the full [`AppState`] to a JSON file; `--lesson` starts a
//! built-in lesson at launch.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anstream::{print, println, stdout};
use anstyle::{AnsiColor, Style};
use anyhow::Context;
use clap::Parser;

use git_tutor::achievements::{self, default_badge_defs};
use git_tutor::config::GitTutorConfig;
use git_tutor::dispatcher::dispatch;
use git_tutor::lesson::LessonEngine;
use git_tutor::lessons::default_lessons;
use git_tutor::persistence::{self, AppState};
use git_tutor::remote::RemoteStore;
use git_tutor::repo::Repo;

const ERROR: Style = Style::new().fg_color(Some(AnsiColor::Red.into()));
const PROMPT: Style = Style::new().fg_color(Some(AnsiColor::Cyan.into())).bold();

#[derive(Parser, Debug)]
#[command(name = "git-tutor", about = "A simulated, in-process Git tutorial engine")]
struct Cli {
    /// Load a previously saved session before starting.
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Save the session to this file on exit (and on `save` command).
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Start a specific built-in lesson by id (see `lessons` for the list).
    #[arg(long, value_name = "LESSON_ID")]
    lesson: Option<String>,
}

struct Session {
    repo: Repo,
    remotes: RemoteStore,
    lessons: LessonEngine,
    badges: indexmap::IndexMap<String, achievements::Badge>,
}

impl Session {
    fn new() -> Self {
        let mut remotes = RemoteStore::new();
        git_tutor::repo::git_commands::seed_remote_store(&mut remotes);
        Session {
            repo: Repo::new(),
            remotes,
            lessons: LessonEngine::new(default_lessons()),
            badges: indexmap::IndexMap::new(),
        }
    }

    fn from_state(state: AppState) -> Self {
        let mut lessons = LessonEngine::new(default_lessons());
        lessons.active_lesson_id = state.active_lesson_id;
        lessons.progress = state.lesson_progress;
        Session { repo: state.repo, remotes: state.remote_store, lessons, badges: state.badges }
    }

    fn to_state(&self) -> AppState {
        AppState {
            version: persistence::STATE_VERSION,
            repo: self.repo.clone(),
            active_lesson_id: self.lessons.active_lesson_id.clone(),
            lesson_progress: self.lessons.progress.clone(),
            badges: self.badges.clone(),
            remote_store: self.remotes.clone(),
        }
    }

    fn sync_badges(&mut self, config: &GitTutorConfig) {
        if !config.auto_sync_badges {
            return;
        }
        achievements::merge_new_badges(&mut self.badges, &default_badge_defs());
        let now = git_tutor::repo::now_timestamp();
        if let Some(event) = self.repo.last_event.clone() {
            achievements::sync_event(&mut self.badges, &event, now);
        }
        achievements::sync_lessons(&mut self.badges, &self.lessons, now);
    }
}

fn main() -> anyhow::Result<()> {
    git_tutor::init_logging();
    let cli = Cli::parse();
    let config = GitTutorConfig::default();

    let mut session = match &cli.load {
        Some(path) => {
            let state = persistence::load_from_file(path)
                .with_context(|| format!("failed to load session from {}", path.display()))?;
            println!("Loaded session from {}", path.display());
            Session::from_state(state)
        }
        None => Session::new(),
    };

    if let Some(lesson_id) = &cli.lesson {
        session.lessons.start(lesson_id, &mut session.repo, &mut session.remotes);
        if let Some(step) = session.lessons.current_step(lesson_id) {
            println!("Lesson '{lesson_id}': {}", step.prompt);
        }
    }

    let stdin = io::stdin();
    print!("{PROMPT}git-tutor>{PROMPT:#} ");
    let _ = stdout().flush();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim() == "exit" || line.trim() == "quit" {
            break;
        }
        if line.trim() == "save" {
            if let Some(path) = &cli.save {
                match persistence::save_to_file(&session.to_state(), path) {
                    Ok(()) => println!("Saved to {}", path.display()),
                    Err(err) => println!("{ERROR}Save failed: {err}{ERROR:#}"),
                }
            } else {
                println!("{ERROR}No --save path configured{ERROR:#}");
            }
            print!("{PROMPT}git-tutor>{PROMPT:#} ");
            let _ = stdout().flush();
            continue;
        }

        let result = dispatch(&line, &mut session.repo, &mut session.remotes);
        for out in &result.stdout {
            println!("{out}");
        }
        for err in &result.stderr {
            println!("{ERROR}{err}{ERROR:#}");
        }
        if let Some(lesson_id) = session.lessons.active_lesson_id.clone() {
            while session.lessons.check_current_step(&session.repo, &session.remotes) {
                match session.lessons.current_step(&lesson_id) {
                    Some(step) => println!("Step complete! Next: {}", step.prompt),
                    None => {
                        println!("Lesson '{lesson_id}' complete!");
                        break;
                    }
                }
            }
        }
        session.sync_badges(&config);

        print!("{PROMPT}git-tutor>{PROMPT:#} ");
        let _ = stdout().flush();
    }

    if let Some(path) = &cli.save {
        persistence::save_to_file(&session.to_state(), path)
            .with_context(|| format!("failed to save session to {}", path.display()))?;
    }
    Ok(())
}
