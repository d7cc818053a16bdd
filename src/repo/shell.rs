//! The shell subset: `pwd, ls, cd, mkdir, touch, rm, cat, echo … > file`.
//!
//! Every mutating operation records a `fs_*` [`super::LastEvent`]. None of
//! these touch the host filesystem — they operate purely on
//! [`super::Repo`]'s virtual working tree and directory set.

use super::{CommandResult, LastEvent, Repo};
use crate::path;

pub fn pwd(repo: &Repo) -> CommandResult {
    CommandResult::ok(vec![repo.cwd.clone()])
}

pub fn ls(repo: &Repo, args: &[String]) -> CommandResult {
    let target = args.first().map(String::as_str).unwrap_or(".");
    let dir = path::join(&repo.cwd, target);

    let prefix = if dir == "/" { "/".to_string() } else { format!("{dir}/") };

    let mut dirs: Vec<String> = repo
        .directories
        .iter()
        .filter_map(|d| {
            if d == "/" || !d.starts_with(&prefix) {
                return None;
            }
            let rest = &d[prefix.len()..];
            (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
        })
        .collect();
    dirs.sort();
    dirs.dedup();

    let mut files: Vec<String> = repo
        .working_files
        .keys()
        .filter_map(|f| {
            if !f.starts_with(&prefix) {
                return None;
            }
            let rest = &f[prefix.len()..];
            (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
        })
        .collect();
    files.sort();
    files.dedup();

    let mut stdout: Vec<String> = dirs.into_iter().map(|d| format!("{d}/")).collect();
    stdout.extend(files);
    CommandResult::ok(stdout)
}

pub fn cd(repo: &mut Repo, args: &[String]) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::usage("usage: cd <path>");
    };
    let dir = path::join(&repo.cwd, target);

    let is_known_dir = dir == "/" || repo.directories.contains(&dir);
    let has_file_under = repo.working_files.keys().any(|f| f.starts_with(&format!("{dir}/")));
    if !is_known_dir && !has_file_under {
        return CommandResult::not_found(format!(
            "cd: {}: No such file or directory",
            path::display(target)
        ));
    }

    repo.cwd = dir;
    CommandResult::ok_empty()
}

pub fn mkdir(repo: &mut Repo, args: &[String]) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::usage("usage: mkdir <path>");
    };
    let dir = path::join(&repo.cwd, target);
    repo.register_ancestor_dirs(&dir);
    repo.directories.insert(dir.clone());
    repo.record_event(LastEvent::FsMkdir { path: dir });
    CommandResult::ok_empty()
}

pub fn touch(repo: &mut Repo, args: &[String]) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::usage("usage: touch <path>");
    };
    let file = path::join(&repo.cwd, target);
    repo.register_ancestor_dirs(&file);
    repo.working_files.entry(file.clone()).or_insert_with(String::new);
    repo.record_event(LastEvent::FsTouch { path: file });
    CommandResult::ok_empty()
}

pub fn rm(repo: &mut Repo, args: &[String]) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::usage("usage: rm <path>");
    };
    let file = path::join(&repo.cwd, target);
    if repo.working_files.shift_remove(&file).is_none() {
        return CommandResult::not_found(format!(
            "rm: {}: No such file or directory",
            path::display(target)
        ));
    }
    repo.record_event(LastEvent::FsRm { path: file });
    CommandResult::ok_empty()
}

pub fn cat(repo: &Repo, args: &[String]) -> CommandResult {
    let Some(target) = args.first() else {
        return CommandResult::usage("usage: cat <path>");
    };
    let file = path::join(&repo.cwd, target);
    match repo.working_files.get(&file) {
        Some(content) => CommandResult::ok(content.lines().map(str::to_string).collect()),
        None => CommandResult::not_found(format!(
            "cat: {}: No such file or directory",
            path::display(target)
        )),
    }
}

pub fn echo_redirect(repo: &mut Repo, text: &str, target: &str) -> CommandResult {
    if target.is_empty() {
        return CommandResult::usage("usage: echo \"text\" > <path>");
    }
    let file = path::join(&repo.cwd, target);
    repo.register_ancestor_dirs(&file);
    repo.working_files.insert(file.clone(), text.to_string());
    repo.record_event(LastEvent::FsWrite { path: file });
    CommandResult::ok_empty()
}
