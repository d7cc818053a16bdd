//! Command dispatch: routes a single tokenized input line to either the
//! `git` subset or the shell subset.
//!
//! This is the single entry point external callers use to drive the engine
//! one command line at a time. It never touches the host filesystem or
//! spawns a process — every branch below bottoms out in a pure [`Repo`]
//! method.

use crate::parser::{parse_echo_redirect, tokenize};
use crate::remote::RemoteStore;
use crate::repo::CommandResult;
use crate::repo::Repo;

/// Dispatch one line of input against `repo`, threading `remotes` through
/// for the commands that touch it (`push`, `pull`, `clone`, `remote`).
pub fn dispatch(line: &str, repo: &mut Repo, remotes: &mut RemoteStore) -> CommandResult {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return CommandResult::ok_empty();
    }

    if let Some((text, path)) = parse_echo_redirect(trimmed) {
        log::debug!("dispatch: echo redirect to {path}");
        return crate::repo::shell::echo_redirect(repo, &text, &path);
    }

    let tokens = tokenize(trimmed);
    let Some(command) = tokens.first() else {
        return CommandResult::ok_empty();
    };
    let args = &tokens[1..];

    log::debug!("dispatch: {command} {args:?}");

    match command.as_str() {
        "git" => dispatch_git(args, repo, remotes),
        "pwd" => crate::repo::shell::pwd(repo),
        "ls" => crate::repo::shell::ls(repo, args),
        "cd" => crate::repo::shell::cd(repo, args),
        "mkdir" => crate::repo::shell::mkdir(repo, args),
        "touch" => crate::repo::shell::touch(repo, args),
        "rm" => crate::repo::shell::rm(repo, args),
        "cat" => crate::repo::shell::cat(repo, args),
        "edit" => dispatch_edit(args),
        "echo" => CommandResult::usage("usage: echo \"text\" > <path>"),
        _ => CommandResult::unknown_command(command),
    }
}

fn dispatch_git(args: &[String], repo: &mut Repo, remotes: &mut RemoteStore) -> CommandResult {
    let Some(subcommand) = args.first() else {
        return CommandResult::usage("usage: git <command> [<args>]");
    };
    let rest = &args[1..];

    match subcommand.as_str() {
        "init" => repo.git_init(),
        "status" => repo.git_status(),
        "add" => repo.git_add(rest),
        "commit" => repo.git_commit(rest),
        "log" => repo.git_log(rest),
        "branch" => repo.git_branch(rest),
        "checkout" => repo.git_checkout(rest),
        "merge" => repo.git_merge(rest),
        "remote" => repo.git_remote(rest, remotes),
        "push" => repo.git_push(rest, remotes),
        "pull" => repo.git_pull(rest, remotes),
        "clone" => match rest.first() {
            Some(url) => repo.git_clone(url, remotes),
            None => CommandResult::usage("usage: git clone <url>"),
        },
        "stash" => repo.git_stash(rest),
        "reset" => repo.git_reset(rest),
        "revert" => repo.git_revert(rest),
        other => CommandResult::unimplemented(&format!("git {other}")),
    }
}

/// `edit <path>` is validated here for shape only — the host UI performs the
/// actual buffer mutation via [`Repo::apply_external_edit`] once the editor
/// closes, since the new contents don't exist at dispatch time.
fn dispatch_edit(args: &[String]) -> CommandResult {
    if args.first().is_none() {
        return CommandResult::usage("usage: edit <path>");
    }
    CommandResult::ok_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized_repo() -> Repo {
        let mut repo = Repo::new();
        let mut remotes = RemoteStore::new();
        dispatch("git init", &mut repo, &mut remotes);
        repo
    }

    #[test]
    fn dispatch_routes_git_and_shell_commands() {
        let mut repo = initialized_repo();
        let mut remotes = RemoteStore::new();
        assert!(dispatch("mkdir src", &mut repo, &mut remotes).ok);
        assert!(dispatch(r#"echo "fn main() {}" > src/main.rs"#, &mut repo, &mut remotes).ok);
        assert!(dispatch("git add .", &mut repo, &mut remotes).ok);
        let result = dispatch(r#"git commit -m "first""#, &mut repo, &mut remotes);
        assert!(result.ok);
        assert_eq!(repo.commits.len(), 1);
    }

    #[test]
    fn dispatch_unknown_command_is_exit_127() {
        let mut repo = initialized_repo();
        let mut remotes = RemoteStore::new();
        let result = dispatch("frobnicate", &mut repo, &mut remotes);
        assert!(!result.ok);
        assert_eq!(result.exit_code, 127);
    }

    #[test]
    fn dispatch_blank_line_is_a_no_op() {
        let mut repo = initialized_repo();
        let mut remotes = RemoteStore::new();
        let result = dispatch("   ", &mut repo, &mut remotes);
        assert!(result.ok);
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn dispatch_edit_requires_a_path() {
        let mut repo = initialized_repo();
        let mut remotes = RemoteStore::new();
        assert!(!dispatch("edit", &mut repo, &mut remotes).ok);
        assert!(dispatch("edit /README.md", &mut repo, &mut remotes).ok);
    }
}
