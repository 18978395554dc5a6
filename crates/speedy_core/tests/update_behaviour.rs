use std::sync::Once;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use speedy_core::{
    update, BatchRegistry, Effect, ItemId, Msg, Notice, SourceFile, Status, SubmitStats,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn file(name: &str, last_modified: u64, bytes: &[u8]) -> SourceFile {
    SourceFile::new(name, last_modified, bytes.to_vec())
}

fn submit(registry: BatchRegistry, files: Vec<SourceFile>) -> (BatchRegistry, Vec<Effect>) {
    update(registry, Msg::FilesSubmitted(files))
}

#[test]
fn submitted_files_are_scheduled_in_order() {
    init_logging();
    let (mut next, effects) = submit(
        BatchRegistry::new(),
        vec![file("b.png", 1, b"bb"), file("a.jpg", 2, b"aaa")],
    );

    assert_eq!(
        effects,
        vec![
            Effect::Convert {
                id: ItemId::new("b.png", 1, 2),
                bytes: Bytes::from_static(b"bb"),
            },
            Effect::Convert {
                id: ItemId::new("a.jpg", 2, 3),
                bytes: Bytes::from_static(b"aaa"),
            },
        ]
    );
    let view = next.view();
    assert_eq!(view.item_count, 2);
    assert!(view.busy);
    assert!(!view.can_download_all);
    assert_eq!(view.items[0].name, "b.png");
    assert_eq!(view.items[1].name, "a.jpg");
    assert!(view.items.iter().all(|row| row.status == Status::Converting));
    assert!(next.consume_dirty());
}

#[test]
fn empty_submission_is_ignored() {
    init_logging();
    let (mut next, effects) = submit(BatchRegistry::new(), Vec::new());

    assert!(effects.is_empty());
    assert_eq!(next.last_submit(), None);
    assert!(!next.consume_dirty());
}

#[test]
fn duplicate_submission_skipped() {
    init_logging();
    let (state, effects) = submit(BatchRegistry::new(), vec![file("photo.png", 7, b"xyz")]);
    assert_eq!(effects.len(), 1);
    let order_before: Vec<_> = state.items().iter().map(|i| i.id().clone()).collect();

    // Same name, timestamp and size: the bytes handle may differ, identity does not.
    let (state, effects) = submit(state, vec![file("photo.png", 7, b"abc")]);
    assert!(effects.is_empty());
    assert_eq!(state.len(), 1);
    let order_after: Vec<_> = state.items().iter().map(|i| i.id().clone()).collect();
    assert_eq!(order_before, order_after);
    assert_eq!(
        state.last_submit(),
        Some(SubmitStats {
            accepted: 0,
            duplicates: 1,
        })
    );
}

#[test]
fn changed_timestamp_is_a_new_item() {
    init_logging();
    let (state, _) = submit(BatchRegistry::new(), vec![file("photo.png", 7, b"xyz")]);
    let (state, effects) = submit(state, vec![file("photo.png", 8, b"xyz")]);

    assert_eq!(effects.len(), 1);
    assert_eq!(state.len(), 2);
}

#[test]
fn submission_with_mixed_new_and_duplicate_files() {
    init_logging();
    let (state, _) = submit(
        BatchRegistry::new(),
        vec![file("a.png", 1, b"a"), file("b.png", 1, b"b")],
    );

    let (state, effects) = submit(
        state,
        vec![file("a.png", 1, b"a"), file("c.png", 1, b"c")],
    );
    assert_eq!(state.len(), 3);
    assert_eq!(effects.len(), 1);
    assert_eq!(
        state.view().last_submit,
        Some(SubmitStats {
            accepted: 1,
            duplicates: 1,
        })
    );
}

#[test]
fn duplicates_within_one_drop_are_collapsed() {
    init_logging();
    let (state, effects) = submit(
        BatchRegistry::new(),
        vec![file("a.png", 1, b"a"), file("a.png", 1, b"a")],
    );

    assert_eq!(state.len(), 1);
    assert_eq!(effects.len(), 1);
}

#[test]
fn archive_click_while_converting_is_ignored() {
    init_logging();
    let (state, _) = submit(BatchRegistry::new(), vec![file("a.png", 1, b"a")]);
    let before = state.clone();

    let (next, effects) = update(state, Msg::ArchiveClicked);

    assert_eq!(next, before);
    assert!(effects.is_empty());
}

#[test]
fn archive_click_with_nothing_converted_notifies() {
    init_logging();
    let (next, effects) = update(BatchRegistry::new(), Msg::ArchiveClicked);

    assert!(next.is_empty());
    assert_eq!(effects, vec![Effect::Notify(Notice::NothingToBundle)]);
    assert_eq!(Notice::NothingToBundle.title(), "No images to download");
}
