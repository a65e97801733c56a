#![forbid(unsafe_code)]

//! The closed set of syncable entity kinds and their static table descriptors.

use serde::{Deserialize, Serialize};

/// A table taking part in the sync protocol. Serializes as its table name,
/// which is also the `type` tag carried by deletion records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Graphs,
    Nodes,
    Edges,
    Notes,
    Checklists,
    ChecklistItems,
    Images,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyType {
    Integer,
    Text,
}

/// How a row of a given kind is tied to the user who may see it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// The row carries the owning user id in `column`.
    Direct { column: &'static str },
    /// The row belongs to a `parent` row referenced by `column`; ownership is
    /// whatever the parent resolves to.
    Parent {
        parent: EntityKind,
        column: &'static str,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindDescriptor {
    pub table: &'static str,
    pub key: KeyType,
    pub ownership: Ownership,
}

impl EntityKind {
    /// Processing order of the collector; parents come before their children.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Graphs,
        EntityKind::Nodes,
        EntityKind::Edges,
        EntityKind::Notes,
        EntityKind::Checklists,
        EntityKind::ChecklistItems,
        EntityKind::Images,
    ];

    pub const fn descriptor(self) -> KindDescriptor {
        match self {
            EntityKind::Graphs => KindDescriptor {
                table: "graphs",
                key: KeyType::Integer,
                ownership: Ownership::Direct { column: "user_id" },
            },
            EntityKind::Nodes => KindDescriptor {
                table: "nodes",
                key: KeyType::Text,
                ownership: Ownership::Parent {
                    parent: EntityKind::Graphs,
                    column: "graph_id",
                },
            },
            EntityKind::Edges => KindDescriptor {
                table: "edges",
                key: KeyType::Text,
                ownership: Ownership::Parent {
                    parent: EntityKind::Graphs,
                    column: "graph_id",
                },
            },
            EntityKind::Notes => KindDescriptor {
                table: "notes",
                key: KeyType::Integer,
                ownership: Ownership::Direct { column: "user_id" },
            },
            EntityKind::Checklists => KindDescriptor {
                table: "checklists",
                key: KeyType::Integer,
                ownership: Ownership::Direct { column: "user_id" },
            },
            EntityKind::ChecklistItems => KindDescriptor {
                table: "checklist_items",
                key: KeyType::Integer,
                ownership: Ownership::Parent {
                    parent: EntityKind::Checklists,
                    column: "checklist_id",
                },
            },
            EntityKind::Images => KindDescriptor {
                table: "images",
                key: KeyType::Integer,
                ownership: Ownership::Direct {
                    column: "uploaded_by",
                },
            },
        }
    }

    pub const fn table(self) -> &'static str {
        self.descriptor().table
    }

    pub const fn key_type(self) -> KeyType {
        self.descriptor().key
    }

    pub const fn ownership(self) -> Ownership {
        self.descriptor().ownership
    }

    /// Key of this kind inside the `updates` object of a sync payload.
    pub const fn wire_key(self) -> &'static str {
        match self {
            EntityKind::Graphs => "graphs",
            EntityKind::Nodes => "nodes",
            EntityKind::Edges => "edges",
            EntityKind::Notes => "notes",
            EntityKind::Checklists => "checklists",
            EntityKind::ChecklistItems => "checklistItems",
            EntityKind::Images => "images",
        }
    }

    pub fn from_table(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.table() == name)
    }

    /// Number of parent hops until a directly owned table is reached.
    pub fn ownership_depth(self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Ownership::Parent { parent, .. } = current.ownership() {
            depth += 1;
            current = parent;
        }
        depth
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_name_matches_table_name() {
        for kind in EntityKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.table()));
            assert_eq!(EntityKind::from_table(kind.table()), Some(kind));
        }
        assert_eq!(EntityKind::from_table("users"), None);
    }

    #[test]
    fn ownership_chains_terminate_at_a_direct_owner() {
        for kind in EntityKind::ALL {
            assert!(kind.ownership_depth() <= EntityKind::ALL.len());
        }
        assert_eq!(EntityKind::Notes.ownership_depth(), 0);
        assert_eq!(EntityKind::Edges.ownership_depth(), 1);
        assert_eq!(EntityKind::ChecklistItems.ownership_depth(), 1);
    }

    #[test]
    fn parents_are_processed_before_children() {
        let position = |kind: EntityKind| {
            EntityKind::ALL
                .iter()
                .position(|candidate| *candidate == kind)
                .unwrap()
        };
        for kind in EntityKind::ALL {
            if let Ownership::Parent { parent, .. } = kind.ownership() {
                assert!(position(parent) < position(kind), "{kind} before {parent}");
            }
        }
    }

    #[test]
    fn client_assigned_keys_are_text() {
        assert_eq!(EntityKind::Nodes.key_type(), KeyType::Text);
        assert_eq!(EntityKind::Edges.key_type(), KeyType::Text);
        assert_eq!(EntityKind::Notes.key_type(), KeyType::Integer);
        assert_eq!(EntityKind::ChecklistItems.wire_key(), "checklistItems");
    }
}
