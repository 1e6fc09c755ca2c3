//! Snapshot replay and merged change ranges.

mod common;

use common::range;
use rstest::rstest;
use vellum::base::TextSize;
use vellum::snapshot::{ChangeRange, SnapshotManager, TextChange};
use vellum::{DocumentId, SnapshotOptions};

fn manager(text: &str) -> SnapshotManager {
    SnapshotManager::new(DocumentId::new(0), text, 1, SnapshotOptions::default())
}

fn apply(text: &str, change: &TextChange) -> String {
    let start = usize::from(change.range.start());
    let end = usize::from(change.range.end());
    format!("{}{}{}", &text[..start], change.new_text, &text[end..])
}

#[test]
fn sequential_edits_merge_into_one_range() {
    let mut snapshots = manager("0123456789");
    let old = snapshots.latest();
    snapshots.push_change(TextChange::insert(TextSize::new(0), "x")).unwrap();
    snapshots.push_change(TextChange::delete(range(1, 2))).unwrap();
    let new = snapshots.latest();

    assert_eq!(new.text(), "x123456789");
    let merged = snapshots.change_range(&old, &new).unwrap();
    assert_eq!(merged, ChangeRange::new(TextSize::new(0), TextSize::new(1), TextSize::new(1)));
}

#[rstest]
#[case::inserts(vec![TextChange::insert(TextSize::new(2), "ab"), TextChange::insert(TextSize::new(8), "cd")])]
#[case::replace_then_delete(vec![TextChange::new(range(3, 6), "XYZW"), TextChange::delete(range(0, 2))])]
#[case::overlapping(vec![TextChange::new(range(4, 8), "-"), TextChange::new(range(2, 6), "++++++")])]
#[case::delete_all(vec![TextChange::delete(range(0, 10)), TextChange::insert(TextSize::new(0), "fresh")])]
#[case::three(vec![
    TextChange::insert(TextSize::new(10), "!"),
    TextChange::new(range(5, 7), ""),
    TextChange::insert(TextSize::new(0), ">>"),
])]
fn replay_and_merge_agree(#[case] changes: Vec<TextChange>) {
    let original = "0123456789";
    let mut snapshots = manager(original);
    let old = snapshots.latest();

    let mut expected = vec![original.to_string()];
    for change in &changes {
        let next = apply(expected.last().unwrap(), change);
        snapshots.push_change(change.clone()).unwrap();
        expected.push(next);
    }

    // Every version replays exactly, whatever is still pending.
    for (i, text) in expected.iter().enumerate().rev() {
        let snapshot = snapshots.snapshot(1 + i as u32).unwrap();
        assert_eq!(snapshot.text(), text, "version {}", 1 + i);
    }

    // The merged range covers every difference between the two texts.
    let new = snapshots.latest();
    let merged = snapshots.change_range(&old, &new).unwrap();
    let start = usize::from(merged.start);
    let old_end = start + usize::from(merged.length);
    let new_end = start + usize::from(merged.new_length);
    let final_text = expected.last().unwrap();
    assert_eq!(&original[..start], &final_text[..start]);
    assert_eq!(&original[old_end..], &final_text[new_end..]);
    assert_eq!(
        original.len() - usize::from(merged.length) + usize::from(merged.new_length),
        final_text.len()
    );
}

#[test]
fn compaction_keeps_referenced_history() {
    let mut snapshots = manager("abc");
    let held = snapshots.latest();
    for _ in 0..8 {
        snapshots.push_change(TextChange::insert(TextSize::new(0), "z")).unwrap();
        snapshots.latest();
    }
    snapshots.compact();
    assert_eq!(snapshots.base_version(), 1);
    let newest = snapshots.latest();
    let merged = snapshots.change_range(&held, &newest).unwrap();
    assert_eq!(merged.new_length - merged.length, TextSize::new(8));

    drop(held);
    assert!(snapshots.compact() > 0);
    assert!(snapshots.base_version() > 1);
    assert!(snapshots.snapshot(1).is_none());
    assert_eq!(snapshots.latest().text(), "zzzzzzzzabc");
}
