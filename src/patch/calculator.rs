use std::cmp::Ordering;

use tracing::debug;

use crate::entry::Entry;
use crate::patch::{Patch, PatchOperation};
use crate::snapshot::Snapshot;

/// Computes the operations that turn `previous` into `next`.
///
/// Both snapshots are sorted, so a single lock-step pass over them is
/// enough. Removals come first, deepest path first, followed by creations
/// and updates, shallowest path first.
pub fn calculate_patch(previous: &Snapshot, next: &Snapshot) -> Patch {
    let mut removals = Vec::new();
    let mut additions = Vec::new();

    let mut previous_iter = previous.iter().peekable();
    let mut next_iter = next.iter().peekable();

    loop {
        let order = match (previous_iter.peek(), next_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(before), Some(after)) => before.relative_path().cmp(after.relative_path()),
        };

        match order {
            Ordering::Less => {
                if let Some(gone) = previous_iter.next() {
                    removals.push(removal_of(gone));
                }
            }
            Ordering::Greater => {
                if let Some(new) = next_iter.next() {
                    additions.push(PatchOperation::creation(new.clone()));
                }
            }
            Ordering::Equal => {
                if let (Some(before), Some(after)) = (previous_iter.next(), next_iter.next()) {
                    if before.kind() != after.kind() {
                        removals.push(removal_of(before));
                        additions.push(PatchOperation::creation(after.clone()));
                    } else if before.is_modified(after) {
                        additions.push(PatchOperation::update(after.clone()));
                    }
                }
            }
        }
    }

    debug!(
        "Calculated patch: {} removals, {} creations or updates",
        removals.len(),
        additions.len()
    );

    removals.reverse();
    removals.extend(additions);
    Patch::from_ordered(removals)
}

/// Puts an unordered set of operations into the order [`calculate_patch`]
/// guarantees: removals deepest first, then everything else shallowest
/// first. Operations on the same path keep their relative order.
pub fn order_operations(operations: impl IntoIterator<Item = PatchOperation>) -> Patch {
    let (mut removals, mut additions): (Vec<_>, Vec<_>) = operations
        .into_iter()
        .partition(PatchOperation::is_removal);

    removals.sort_by(|a, b| b.relative_path().cmp(a.relative_path()));
    additions.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));

    removals.extend(additions);
    Patch::from_ordered(removals)
}

fn removal_of(entry: &Entry) -> PatchOperation {
    PatchOperation::removal(entry.kind(), entry.relative_path().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKind, RelativePath};
    use crate::patch::Operation;
    use rstest::*;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn node(kind: EntryKind, path: &str, size: u64, mtime_secs: u64, mode: u32) -> Entry {
        Entry::new(
            kind,
            size,
            SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs),
            mode,
            RelativePath::new(path).unwrap(),
            PathBuf::from("/in"),
        )
    }

    fn file(path: &str) -> Entry {
        node(EntryKind::File, path, 1, 1, 0o644)
    }

    fn dir(path: &str) -> Entry {
        node(EntryKind::Directory, path, 0, 1, 0o755)
    }

    fn snapshot(entries: Vec<Entry>) -> Snapshot {
        Snapshot::from_entries(entries)
    }

    fn summary(patch: &Patch) -> Vec<(Operation, &str)> {
        patch
            .iter()
            .map(|op| (op.operation(), op.relative_path().as_str()))
            .collect()
    }

    #[fixture]
    fn tree() -> Snapshot {
        snapshot(vec![
            dir("a"),
            dir("a/b"),
            file("a/b/c.txt"),
            file("a/d.txt"),
            file("a-e.txt"),
            file("z.txt"),
        ])
    }

    #[rstest]
    fn identical_snapshots_produce_nothing(tree: Snapshot) {
        assert!(calculate_patch(&tree, &tree).is_empty());
        assert!(calculate_patch(&Snapshot::empty(), &Snapshot::empty()).is_empty());
    }

    #[rstest]
    fn first_pass_creates_everything_shallowest_first(tree: Snapshot) {
        let patch = calculate_patch(&Snapshot::empty(), &tree);

        assert_eq!(
            summary(&patch),
            vec![
                (Operation::Mkdir, "a"),
                (Operation::Mkdir, "a/b"),
                (Operation::Create, "a/b/c.txt"),
                (Operation::Create, "a/d.txt"),
                (Operation::Create, "a-e.txt"),
                (Operation::Create, "z.txt"),
            ]
        );
        assert!(patch.iter().all(|op| op.entry().is_some()));
    }

    #[rstest]
    fn emptying_removes_everything_deepest_first(tree: Snapshot) {
        let patch = calculate_patch(&tree, &Snapshot::empty());

        assert_eq!(
            summary(&patch),
            vec![
                (Operation::Unlink, "z.txt"),
                (Operation::Unlink, "a-e.txt"),
                (Operation::Unlink, "a/d.txt"),
                (Operation::Unlink, "a/b/c.txt"),
                (Operation::Rmdir, "a/b"),
                (Operation::Rmdir, "a"),
            ]
        );
        assert!(patch.iter().all(|op| op.entry().is_none()));
    }

    #[rstest]
    #[case(node(EntryKind::File, "f", 2, 1, 0o644))]
    #[case(node(EntryKind::File, "f", 1, 2, 0o644))]
    #[case(node(EntryKind::File, "f", 1, 1, 0o600))]
    fn changed_file_metadata_is_an_update(#[case] changed: Entry) {
        let previous = snapshot(vec![node(EntryKind::File, "f", 1, 1, 0o644)]);
        let next = snapshot(vec![changed.clone()]);

        let patch = calculate_patch(&previous, &next);

        assert_eq!(summary(&patch), vec![(Operation::Update, "f")]);
        assert_eq!(patch[0].entry(), Some(&changed));
    }

    #[test]
    fn directories_only_update_on_mode_change() {
        let previous = snapshot(vec![node(EntryKind::Directory, "d", 0, 1, 0o755)]);
        let touched = snapshot(vec![node(EntryKind::Directory, "d", 4096, 9, 0o755)]);
        let chmoded = snapshot(vec![node(EntryKind::Directory, "d", 0, 1, 0o700)]);

        assert!(calculate_patch(&previous, &touched).is_empty());
        assert_eq!(
            summary(&calculate_patch(&previous, &chmoded)),
            vec![(Operation::Update, "d")]
        );
    }

    #[test]
    fn file_becoming_a_directory_is_removed_then_created() {
        let previous = snapshot(vec![file("x")]);
        let next = snapshot(vec![dir("x"), file("x/inner.txt")]);

        assert_eq!(
            summary(&calculate_patch(&previous, &next)),
            vec![
                (Operation::Unlink, "x"),
                (Operation::Mkdir, "x"),
                (Operation::Create, "x/inner.txt"),
            ]
        );
    }

    #[test]
    fn directory_becoming_a_file_is_emptied_first() {
        let previous = snapshot(vec![dir("x"), file("x/inner.txt")]);
        let next = snapshot(vec![file("x")]);

        assert_eq!(
            summary(&calculate_patch(&previous, &next)),
            vec![
                (Operation::Unlink, "x/inner.txt"),
                (Operation::Rmdir, "x"),
                (Operation::Create, "x"),
            ]
        );
    }

    #[rstest]
    fn mixed_changes_keep_both_phases_ordered(tree: Snapshot) {
        let next = snapshot(vec![
            dir("a"),
            file("a/d.txt"),
            node(EntryKind::File, "a-e.txt", 7, 1, 0o644),
            dir("n"),
            file("n/new.txt"),
            file("z.txt"),
        ]);

        assert_eq!(
            summary(&calculate_patch(&tree, &next)),
            vec![
                (Operation::Unlink, "a/b/c.txt"),
                (Operation::Rmdir, "a/b"),
                (Operation::Update, "a-e.txt"),
                (Operation::Mkdir, "n"),
                (Operation::Create, "n/new.txt"),
            ]
        );
    }

    #[rstest]
    fn nested_paths_never_precede_their_directory(tree: Snapshot) {
        let created = calculate_patch(&Snapshot::empty(), &tree);
        let removed = calculate_patch(&tree, &Snapshot::empty());

        for (i, op) in created.iter().enumerate() {
            for later in created.iter().skip(i + 1) {
                assert!(!later.relative_path().is_ancestor_of(op.relative_path()));
            }
        }
        for (i, op) in removed.iter().enumerate() {
            for later in removed.iter().skip(i + 1) {
                assert!(!op.relative_path().is_ancestor_of(later.relative_path()));
            }
        }
    }

    #[test]
    fn order_operations_sorts_both_phases() {
        let operations = vec![
            PatchOperation::creation(file("bro/apple.txt")),
            PatchOperation::removal(EntryKind::Directory, RelativePath::new("old").unwrap()),
            PatchOperation::creation(dir("bro")),
            PatchOperation::removal(EntryKind::File, RelativePath::new("old/f.txt").unwrap()),
            PatchOperation::update(file("a.txt")),
        ];

        assert_eq!(
            summary(&order_operations(operations)),
            vec![
                (Operation::Unlink, "old/f.txt"),
                (Operation::Rmdir, "old"),
                (Operation::Update, "a.txt"),
                (Operation::Mkdir, "bro"),
                (Operation::Create, "bro/apple.txt"),
            ]
        );
    }
}
