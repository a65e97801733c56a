#![forbid(unsafe_code)]

//! Wire shapes of a sync response and the assembler that builds them.

use crate::ids::RowKey;
use crate::kind::EntityKind;
use crate::model::{
    ChecklistItemRow, ChecklistRow, EdgeRow, GraphRow, ImageRow, NodeRow, NoteRow, SyncRow,
};
use serde::{Deserialize, Serialize};

/// Live rows changed after the cutoff, keyed by kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUpdates {
    pub graphs: Vec<GraphRow>,
    pub nodes: Vec<NodeRow>,
    pub edges: Vec<EdgeRow>,
    pub notes: Vec<NoteRow>,
    pub checklists: Vec<ChecklistRow>,
    pub checklist_items: Vec<ChecklistItemRow>,
    pub images: Vec<ImageRow>,
}

impl SyncUpdates {
    pub fn len(&self) -> usize {
        EntityKind::ALL.into_iter().map(|kind| self.count(kind)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Graphs => self.graphs.len(),
            EntityKind::Nodes => self.nodes.len(),
            EntityKind::Edges => self.edges.len(),
            EntityKind::Notes => self.notes.len(),
            EntityKind::Checklists => self.checklists.len(),
            EntityKind::ChecklistItems => self.checklist_items.len(),
            EntityKind::Images => self.images.len(),
        }
    }

    /// Keys of the updated rows of one kind, in payload order.
    pub fn keys(&self, kind: EntityKind) -> Vec<RowKey> {
        fn keys_of<R: SyncRow>(rows: &[R]) -> Vec<RowKey> {
            rows.iter().map(SyncRow::key).collect()
        }
        match kind {
            EntityKind::Graphs => keys_of(&self.graphs),
            EntityKind::Nodes => keys_of(&self.nodes),
            EntityKind::Edges => keys_of(&self.edges),
            EntityKind::Notes => keys_of(&self.notes),
            EntityKind::Checklists => keys_of(&self.checklists),
            EntityKind::ChecklistItems => keys_of(&self.checklist_items),
            EntityKind::Images => keys_of(&self.images),
        }
    }
}

/// One deletion record of the flattened `deletions` list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone {
    pub id: RowKey,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub updates: SyncUpdates,
    pub deletions: Vec<Tombstone>,
    pub server_timestamp: i64,
}

/// Keys of the rows of one kind tombstoned after the cutoff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletedKeys {
    pub kind: EntityKind,
    pub keys: Vec<RowKey>,
}

/// Raw collector output, before flattening.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    pub updated: SyncUpdates,
    pub deleted: Vec<DeletedKeys>,
}

impl ChangeSet {
    pub fn deleted_keys(&self, kind: EntityKind) -> &[RowKey] {
        self.deleted
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.keys.as_slice())
            .unwrap_or(&[])
    }

    pub fn deleted_len(&self) -> usize {
        self.deleted.iter().map(|entry| entry.keys.len()).sum()
    }
}

/// Packages a change set into the response payload. Deletions are flattened
/// in table-processing order regardless of the order the collector pushed
/// them; `collection_start_ms` must have been captured before scanning began.
pub fn assemble(changes: ChangeSet, collection_start_ms: i64) -> SyncPayload {
    let ChangeSet {
        updated,
        mut deleted,
    } = changes;

    deleted.sort_by_key(|entry| processing_position(entry.kind));
    let deletions = deleted
        .into_iter()
        .flat_map(|entry| {
            let kind = entry.kind;
            entry.keys.into_iter().map(move |id| Tombstone { id, kind })
        })
        .collect();

    SyncPayload {
        updates: updated,
        deletions,
        server_timestamp: collection_start_ms,
    }
}

fn processing_position(kind: EntityKind) -> usize {
    EntityKind::ALL
        .iter()
        .position(|candidate| *candidate == kind)
        .unwrap_or(EntityKind::ALL.len())
}
