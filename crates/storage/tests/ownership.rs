use ng_core::ids::{RowKey, UserId};
use ng_core::kind::EntityKind;
use ng_storage::{
    CreateChecklistItemRequest, CreateChecklistRequest, CreateGraphRequest, CreateImageRequest,
    CreateNodeRequest, CreateUserRequest, NodePosition, SqliteStore, StoreError,
    UpdateGraphRequest, UpdateNodeRequest,
};
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

fn graph_with_node(store: &mut SqliteStore, user: UserId, node_id: &str) -> i64 {
    let graph = store
        .create_graph(CreateGraphRequest {
            user_id: user,
            title: "canvas".to_string(),
            now_ms: 10,
        })
        .expect("graph should be created");
    store
        .create_node(CreateNodeRequest {
            user_id: user,
            graph_id: graph.id,
            node_id: node_id.to_string(),
            node_type: None,
            position: NodePosition { x: 0.0, y: 0.0 },
            data_label: None,
            data_content: None,
            style_width: None,
            style_height: None,
            now_ms: 11,
        })
        .expect("node should be created");
    graph.id
}

#[test]
fn owner_resolves_directly_and_through_parents() {
    let (_dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    let graph_id = graph_with_node(&mut store, alice, "n1");

    assert_eq!(
        store.resolve_owner(EntityKind::Graphs, &RowKey::Int(graph_id)).unwrap(),
        Some(alice)
    );
    assert_eq!(
        store.resolve_owner(EntityKind::Nodes, &RowKey::from("n1")).unwrap(),
        Some(alice)
    );

    let list = store
        .create_checklist(CreateChecklistRequest {
            user_id: alice,
            title: "todo".to_string(),
            now_ms: 1,
        })
        .unwrap();
    let item = store
        .create_checklist_item(CreateChecklistItemRequest {
            user_id: alice,
            checklist_id: list.id,
            parent_item_id: None,
            content: "x".to_string(),
            now_ms: 2,
        })
        .unwrap();
    assert_eq!(
        store
            .resolve_owner(EntityKind::ChecklistItems, &RowKey::Int(item.id))
            .unwrap(),
        Some(alice)
    );

    let image = store
        .create_image(CreateImageRequest {
            uploaded_by: alice,
            filename: "a.png".to_string(),
            filepath: "1-a.png".to_string(),
            mimetype: "image/png".to_string(),
            size: 10,
            now_ms: 3,
        })
        .unwrap();
    assert_eq!(
        store.resolve_owner(EntityKind::Images, &RowKey::Int(image.id)).unwrap(),
        Some(alice)
    );
}

#[test]
fn tombstoned_ancestor_breaks_the_chain() {
    let (_dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    let graph_id = graph_with_node(&mut store, alice, "n1");

    store
        .soft_delete(EntityKind::Graphs, &RowKey::Int(graph_id), 50)
        .unwrap();
    assert_eq!(
        store.resolve_owner(EntityKind::Nodes, &RowKey::from("n1")).unwrap(),
        None
    );
    assert_eq!(
        store.resolve_owner(EntityKind::Nodes, &RowKey::from("missing")).unwrap(),
        None
    );
}

#[test]
fn foreign_rows_look_missing() {
    let (_dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    let mallory = register(&mut store, "mallory");
    let graph_id = graph_with_node(&mut store, alice, "n1");

    assert!(matches!(store.get_graph(mallory, graph_id), Err(StoreError::NotFound)));
    assert!(matches!(store.list_nodes(mallory, graph_id), Err(StoreError::NotFound)));
    assert!(matches!(
        store.update_graph(UpdateGraphRequest {
            user_id: mallory,
            graph_id,
            title: "pwned".to_string(),
            now_ms: 20,
        }),
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.update_node(UpdateNodeRequest {
            user_id: mallory,
            graph_id,
            node_id: "n1".to_string(),
            node_type: None,
            position: Some(NodePosition { x: 9.0, y: 9.0 }),
            data_label: None,
            data_content: None,
            image_url: None,
            style_width: None,
            style_height: None,
            now_ms: 20,
        }),
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.delete_node(mallory, graph_id, "n1", 20),
        Err(StoreError::NotFound)
    ));
    assert!(matches!(store.delete_graph(mallory, graph_id, 20), Err(StoreError::NotFound)));

    assert_eq!(store.get_graph(alice, graph_id).unwrap().title, "canvas");
    assert_eq!(store.list_nodes(alice, graph_id).unwrap().len(), 1);
}

#[test]
fn node_must_belong_to_the_addressed_graph() {
    let (_dir, mut store) = open_store();
    let alice = register(&mut store, "alice");
    graph_with_node(&mut store, alice, "n1");
    let other_graph = graph_with_node(&mut store, alice, "n2");

    assert!(matches!(
        store.delete_node(alice, other_graph, "n1", 20),
        Err(StoreError::NotFound)
    ));
}
