//! Workspace lifecycle: atomic generation swaps, staleness, cancellation.

mod common;

use std::sync::Arc;

use common::{WordEngine, find_nth, open, range, sfc_regions};
use vellum::base::DocumentPath;
use vellum::ide;
use vellum::mapping::Capabilities;
use vellum::project::{Cancelled, SyntheticKind, Workspace, WorkspaceError};
use vellum::snapshot::TextChange;
use vellum::{DocumentId, Options, TextSize};

const TEXT: &str = "<template>{{ x }}</template>";

#[test]
fn old_generation_is_untouched_by_regeneration() {
    let (workspace, doc) = open(TEXT);
    let before = workspace.generation(doc).unwrap();
    let script_before = Arc::clone(&before.get(SyntheticKind::Script).unwrap().text);
    let mappings_before = before.get(SyntheticKind::Script).unwrap().source_map.clone();

    let x = find_nth(TEXT, "x", 0);
    let after = workspace
        .update(
            doc,
            [TextChange::insert(x.end(), "yz")],
            sfc_regions("<template>{{ xyz }}</template>"),
        )
        .unwrap();

    let old_script = before.get(SyntheticKind::Script).unwrap();
    assert_eq!(old_script.text, script_before);
    assert_eq!(old_script.source_map, mappings_before);
    assert!(old_script.text.contains("__v_ctx.x)"));

    let new_script = after.get(SyntheticKind::Script).unwrap();
    assert!(new_script.text.contains("__v_ctx.xyz)"));
    assert!(new_script.version > old_script.version);
    assert_eq!(after.source_version(), before.source_version() + 1);
    assert!(Arc::ptr_eq(&workspace.generation(doc).unwrap(), &after));
}

#[test]
fn published_versions_never_go_back() {
    let (workspace, doc) = open(TEXT);
    let script_version =
        |workspace: &Workspace| workspace.generation(doc).unwrap().get(SyntheticKind::Script).unwrap().version;

    let first = script_version(&workspace);
    workspace.regenerate(doc).unwrap();
    let second = script_version(&workspace);
    workspace.regenerate(doc).unwrap();
    let third = script_version(&workspace);
    assert!(first < second && second < third);
}

#[test]
fn concurrent_edits_leave_the_newest_generation_published() {
    let (workspace, doc) = open(TEXT);
    let x = find_nth(TEXT, "x", 0).end();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    workspace.apply_changes(doc, [TextChange::insert(x, "y")]).unwrap();
                    workspace.regenerate(doc).unwrap();
                }
            });
        }
    });

    let generation = workspace.generation(doc).unwrap();
    assert_eq!(workspace.document_version(doc), Some(101));
    assert_eq!(generation.source_version(), 101);
    assert!(workspace.is_current(&generation));
    assert_eq!(generation.get(SyntheticKind::Script).unwrap().version, 101);
}

#[test]
fn analysis_is_a_stable_view() {
    let (workspace, doc) = open(TEXT);
    let analysis = workspace.analysis();
    let id = analysis.synthetic_documents()[0].id;
    let text = analysis.synthetic_text(id).unwrap();

    workspace
        .apply_changes(doc, [TextChange::insert(TextSize::new(13), "a + ")])
        .unwrap();
    workspace.set_regions(doc, sfc_regions("<template>{{ a + x }}</template>")).unwrap();
    let fresh = workspace.analysis();

    assert_eq!(analysis.synthetic_text(id).unwrap(), text);
    assert!(fresh.synthetic_text(id).unwrap().contains("__v_ctx.a + __v_ctx.x"));
}

#[test]
fn staleness_is_detectable() {
    let (workspace, doc) = open(TEXT);
    let generation = workspace.generation(doc).unwrap();
    assert!(workspace.is_current(&generation));

    let version = workspace
        .apply_changes(doc, [TextChange::insert(TextSize::new(0), " ")])
        .unwrap();
    assert_eq!(version, 2);
    assert!(!workspace.is_current(&generation));
    assert_eq!(workspace.document_version(doc), Some(2));

    workspace.set_regions(doc, sfc_regions(&format!(" {TEXT}"))).unwrap();
    let regenerated = workspace.regenerate(doc).unwrap();
    assert!(workspace.is_current(&regenerated));
}

#[test]
fn edits_cancel_outstanding_queries() {
    let (workspace, doc) = open(TEXT);
    let engine = WordEngine {
        flagged: vec![("x", "bad x")],
    };
    let analysis = workspace.analysis();

    let token = workspace.cancellation_token();
    let found = ide::workspace_diagnostics(&analysis, &engine, &token).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].range, find_nth(TEXT, "x", 0));

    workspace
        .apply_changes(doc, [TextChange::insert(TextSize::new(0), "\n")])
        .unwrap();
    assert!(token.is_cancelled());
    assert_eq!(
        ide::workspace_diagnostics(&analysis, &engine, &token),
        Err(Cancelled)
    );

    let fresh = workspace.cancellation_token();
    assert!(ide::workspace_diagnostics(&workspace.analysis(), &engine, &fresh).is_ok());
}

#[test]
fn unknown_documents_are_errors() {
    let workspace = Workspace::new(Options::default());
    let ghost = DocumentId::new(42);
    assert_eq!(
        workspace.apply_changes(ghost, [TextChange::insert(TextSize::new(0), "a")]),
        Err(WorkspaceError::UnknownDocument(ghost))
    );
    assert!(workspace.regenerate(ghost).is_none());
}

#[test]
fn out_of_bounds_edit_is_rejected() {
    let (workspace, doc) = open(TEXT);
    let result = workspace.apply_changes(doc, [TextChange::delete(range(20, 99))]);
    assert!(matches!(result, Err(WorkspaceError::Change(_))));
    assert_eq!(workspace.document_version(doc), Some(1));
}

#[test]
fn close_forgets_the_document() {
    let workspace = Workspace::new(Options::default());
    let path = DocumentPath::new("file:///app/src/./Comp.vue");
    let doc = workspace.open(&path, TEXT, 1, sfc_regions(TEXT));
    assert_eq!(workspace.id_for(&DocumentPath::new("/app/src/Comp.vue")), Some(doc));
    assert_eq!(workspace.documents(), vec![doc]);

    workspace.close(doc);
    assert!(workspace.generation(doc).is_none());
    assert!(workspace.documents().is_empty());
    let analysis = workspace.analysis();
    assert!(analysis.map_to_synthetic(doc, find_nth(TEXT, "x", 0), Capabilities::HOVER).is_empty());
}

#[test]
fn options_reach_the_generators() {
    let workspace = Workspace::new(Options::default().with_ctx_name("ctx"));
    let doc = workspace.open(&DocumentPath::new("/a.vue"), TEXT, 1, sfc_regions(TEXT));
    let generation = workspace.generation(doc).unwrap();
    let script = &generation.get(SyntheticKind::Script).unwrap().text;
    assert!(script.contains("const ctx = __v_componentContext();"));
    assert!(script.contains("(ctx.x);"));
}
