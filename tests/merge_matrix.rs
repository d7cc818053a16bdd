//! Table-driven matrices over the ancestor search and three-way merge,
//! exercised across a handful of small hand-built DAG shapes.

use indexmap::IndexMap;
use rstest::rstest;

use git_tutor::repo::merge::{common_ancestor, is_ancestor, three_way_merge};
use git_tutor::repo::Commit;

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

/// a -> b -> c1
///           \-> c2 -> d
fn sample_dag() -> IndexMap<String, Commit> {
    let mut commits = IndexMap::new();
    commits.insert("a".to_string(), commit("a", &[]));
    commits.insert("b".to_string(), commit("b", &["a"]));
    commits.insert("c1".to_string(), commit("c1", &["b"]));
    commits.insert("c2".to_string(), commit("c2", &["b"]));
    commits.insert("d".to_string(), commit("d", &["c2"]));
    commits
}

#[rstest]
#[case("a", "a", true)]
#[case("a", "b", true)]
#[case("a", "d", true)]
#[case("b", "c1", true)]
#[case("b", "c2", true)]
#[case("c1", "c2", false)]
#[case("c1", "d", false)]
#[case("d", "c1", false)]
fn is_ancestor_matrix(#[case] ancestor: &str, #[case] descendant: &str, #[case] expected: bool) {
    let commits = sample_dag();
    assert_eq!(is_ancestor(&commits, ancestor, descendant), expected);
}

#[rstest]
#[case("c1", "c2", "b")]
#[case("c1", "d", "b")]
#[case("a", "d", "a")]
#[case("b", "d", "b")]
fn common_ancestor_matrix(#[case] a: &str, #[case] b: &str, #[case] expected: &str) {
    let commits = sample_dag();
    assert_eq!(common_ancestor(&commits, a, b), Some(expected.to_string()));
}

fn files(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[rstest]
// Neither side touched a path present at base: carried through unchanged.
#[case(&[("f", "1")], &[("f", "1")], &[("f", "1")], &[("f", "1")], &[])]
// Only ours changed: take ours.
#[case(&[("f", "1")], &[("f", "2")], &[("f", "1")], &[("f", "2")], &[])]
// Only theirs changed: take theirs.
#[case(&[("f", "1")], &[("f", "1")], &[("f", "2")], &[("f", "2")], &[])]
// Both sides changed the same way: no conflict, converges.
#[case(&[("f", "1")], &[("f", "2")], &[("f", "2")], &[("f", "2")], &[])]
// Ours deleted, theirs unchanged: deletion wins.
#[case(&[("f", "1")], &[], &[("f", "1")], &[], &[])]
fn three_way_merge_no_conflict_matrix(
    #[case] base: &[(&str, &str)],
    #[case] ours: &[(&str, &str)],
    #[case] theirs: &[(&str, &str)],
    #[case] expected: &[(&str, &str)],
    #[case] expected_conflicts: &[&str],
) {
    let outcome = three_way_merge(&files(base), &files(ours), &files(theirs), "feature");
    assert_eq!(outcome.files, files(expected));
    assert_eq!(outcome.conflicts, expected_conflicts.iter().map(|s| s.to_string()).collect::<Vec<_>>());
}

#[rstest]
#[case("1", "2", "3")]
#[case("x", "y", "z")]
fn three_way_merge_both_sides_edit_differently_conflicts(
    #[case] base_value: &str,
    #[case] ours_value: &str,
    #[case] theirs_value: &str,
) {
    let base = files(&[("config", base_value)]);
    let ours = files(&[("config", ours_value)]);
    let theirs = files(&[("config", theirs_value)]);

    let outcome = three_way_merge(&base, &ours, &theirs, "feature");
    assert_eq!(outcome.conflicts, vec!["config".to_string()]);
    let merged = &outcome.files["config"];
    assert!(merged.contains(&format!("<<<<<<< HEAD\n{ours_value}\n")));
    assert!(merged.contains(&format!("\n{theirs_value}\n>>>>>>> feature")));
}
