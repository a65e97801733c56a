use ng_core::ids::{RowKey, UserId};
use ng_core::kind::EntityKind;
use ng_storage::{
    CreateChecklistItemRequest, CreateChecklistRequest, CreateEdgeRequest, CreateGraphRequest,
    CreateNodeRequest, CreateNoteRequest, CreateUserRequest, DB_FILE_NAME, LIVE, NodePosition,
    SqliteStore, StoreError,
};
use rusqlite::{Connection, params};
use tempfile::TempDir;

fn open_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("temp dir must be creatable");
    let store = SqliteStore::open(dir.path()).expect("fresh storage should open");
    (dir, store)
}

fn register(store: &mut SqliteStore, username: &str) -> UserId {
    let user = store
        .create_user(CreateUserRequest {
            username: username.to_string(),
            password_hash: "argon2-hash".to_string(),
            now_ms: 1,
        })
        .expect("user should be created");
    UserId::new(user.id)
}

fn raw_timestamps(dir: &TempDir, table: &str, id: &dyn rusqlite::ToSql) -> (i64, Option<i64>) {
    let conn = Connection::open(dir.path().join(DB_FILE_NAME)).expect("raw connection");
    conn.query_row(
        &format!("SELECT updated_at, deleted_at FROM {table} WHERE id=?1"),
        params![id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .expect("row must still exist physically")
}

fn node(user: UserId, graph_id: i64, id: &str, now_ms: i64) -> CreateNodeRequest {
    CreateNodeRequest {
        user_id: user,
        graph_id,
        node_id: id.to_string(),
        node_type: Some("bubble".to_string()),
        position: NodePosition { x: 1.0, y: 2.0 },
        data_label: None,
        data_content: None,
        style_width: Some(120.0),
        style_height: None,
        now_ms,
    }
}

#[test]
fn soft_delete_is_idempotent_and_keeps_the_row() {
    let (dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    let note = store
        .create_note(CreateNoteRequest {
            user_id: alice,
            title: Some("t".to_string()),
            content: "c".to_string(),
            tags: None,
            now_ms: 100,
        })
        .unwrap();
    let key = RowKey::Int(note.id);

    assert_eq!(store.soft_delete(EntityKind::Notes, &key, 200).unwrap(), 1);
    assert_eq!(store.soft_delete(EntityKind::Notes, &key, 300).unwrap(), 0);
    assert_eq!(
        store.soft_delete(EntityKind::Notes, &RowKey::Int(9_999), 300).unwrap(),
        0
    );

    let (updated_at, deleted_at) = raw_timestamps(&dir, "notes", &note.id);
    assert_eq!(deleted_at, Some(200));
    assert_eq!(updated_at, 200);
}

#[test]
fn soft_delete_bumps_updated_at_past_a_future_timestamp() {
    let (dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    let note = store
        .create_note(CreateNoteRequest {
            user_id: alice,
            title: None,
            content: "c".to_string(),
            tags: None,
            now_ms: 5_000,
        })
        .unwrap();

    // server clock stepped backwards
    store
        .soft_delete(EntityKind::Notes, &RowKey::Int(note.id), 4_000)
        .unwrap();
    let (updated_at, deleted_at) = raw_timestamps(&dir, "notes", &note.id);
    assert_eq!(updated_at, 5_001);
    assert_eq!(deleted_at, Some(4_000));
}

#[test]
fn tombstoned_rows_disappear_from_live_reads() {
    let (_dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    let note = store
        .create_note(CreateNoteRequest {
            user_id: alice,
            title: None,
            content: "gone soon".to_string(),
            tags: None,
            now_ms: 10,
        })
        .unwrap();
    store.delete_note(alice, note.id, 20).unwrap();

    assert!(matches!(store.get_note(alice, note.id), Err(StoreError::NotFound)));
    assert!(store.list_notes(alice).unwrap().is_empty());
    assert!(matches!(
        store.delete_note(alice, note.id, 30),
        Err(StoreError::NotFound)
    ));
    assert_eq!(store.resolve_owner(EntityKind::Notes, &RowKey::Int(note.id)).unwrap(), None);
    assert_eq!(LIVE, "deleted_at IS NULL");
}

#[test]
fn node_deletion_tombstones_touching_edges_only() {
    let (dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    let graph = store
        .create_graph(CreateGraphRequest {
            user_id: alice,
            title: "g".to_string(),
            now_ms: 1,
        })
        .unwrap();
    for id in ["a", "b", "c"] {
        store.create_node(node(alice, graph.id, id, 2)).unwrap();
    }
    for (id, source, target) in [("a-b", "a", "b"), ("c-a", "c", "a"), ("b-c", "b", "c")] {
        store
            .create_edge(CreateEdgeRequest {
                user_id: alice,
                graph_id: graph.id,
                edge_id: id.to_string(),
                source_node_id: source.to_string(),
                target_node_id: target.to_string(),
                source_handle: None,
                target_handle: None,
                marker_start: None,
                marker_end: None,
                now_ms: 3,
            })
            .unwrap();
    }

    store.delete_node(alice, graph.id, "a", 10).unwrap();

    let live: Vec<String> = store
        .list_edges(alice, graph.id)
        .unwrap()
        .into_iter()
        .map(|edge| edge.id)
        .collect();
    assert_eq!(live, vec!["b-c".to_string()]);
    assert_eq!(raw_timestamps(&dir, "edges", &"a-b").1, Some(10));
    assert_eq!(raw_timestamps(&dir, "edges", &"c-a").1, Some(10));
}

#[test]
fn checklist_and_item_deletion_cascade_through_nesting() {
    let (dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    let list = store
        .create_checklist(CreateChecklistRequest {
            user_id: alice,
            title: "trip".to_string(),
            now_ms: 1,
        })
        .unwrap();
    let mut add = |parent: Option<i64>, content: &str| {
        store
            .create_checklist_item(CreateChecklistItemRequest {
                user_id: alice,
                checklist_id: list.id,
                parent_item_id: parent,
                content: content.to_string(),
                now_ms: 2,
            })
            .unwrap()
            .id
    };
    let root = add(None, "pack");
    let child = add(Some(root), "clothes");
    let grandchild = add(Some(child), "socks");
    let sibling = add(None, "tickets");

    store.delete_checklist_item(alice, list.id, root, 10).unwrap();
    for id in [root, child, grandchild] {
        assert_eq!(raw_timestamps(&dir, "checklist_items", &id).1, Some(10));
    }
    assert_eq!(raw_timestamps(&dir, "checklist_items", &sibling).1, None);

    store.delete_checklist(alice, list.id, 20).unwrap();
    assert_eq!(raw_timestamps(&dir, "checklist_items", &sibling).1, Some(20));
    // already tombstoned rows keep their original deletion time
    assert_eq!(raw_timestamps(&dir, "checklist_items", &root).1, Some(10));
}
