//! The tagged-variant value model every extracted C construct is stored as.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Which source tree an entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Area {
    Kernel,
    Module,
}

/// The seven constructs the parsers recognise.
///
/// `kind_priority` gives the secondary emission tiebreak used when two
/// entities are otherwise unordered in the topological drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum EntityKind {
    Macro,
    Enum,
    Typedef,
    Struct,
    Global,
    Declaration,
    Function,
}

impl EntityKind {
    pub fn kind_priority(self) -> u8 {
        match self {
            EntityKind::Macro => 1,
            EntityKind::Enum => 2,
            EntityKind::Typedef => 3,
            EntityKind::Struct => 4,
            EntityKind::Global => 5,
            EntityKind::Declaration => 6,
            EntityKind::Function => 7,
        }
    }
}

/// Process-unique opaque handle for a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out process-unique ids. The driver owns one instance per pipeline
/// run; kernel and module areas may be parsed in parallel as long as id
/// allocation stays collision-free — this allocator supports that by
/// letting each area start from a distinct offset (see
/// `IdAllocator::for_area`).
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn starting_at(offset: u32) -> Self {
        IdAllocator { next: offset }
    }

    /// A generous per-area id-space split so two allocators used for
    /// parallel kernel/module parsing can never collide before the
    /// driver unions their entities at graph-build time.
    pub fn for_area(area: Area) -> Self {
        match area {
            Area::Kernel => IdAllocator::starting_at(0),
            Area::Module => IdAllocator::starting_at(1_000_000_000),
        }
    }

    pub fn next(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// A single extracted top-level C construct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub area: Area,
    /// The identifier introduced (synthetic for anonymous enums).
    pub name: String,
    /// Exact original text, with comments/strings still escrowed.
    pub code: String,
    /// Identifiers this entity *defines* — usually `{name}`.
    pub ids: BTreeSet<String>,
    /// Text other entities search for references into this entity.
    pub tags: String,
    /// A forward declaration to emit immediately before this vertex,
    /// attached by the slicer when breaking a function mutual-recursion
    /// cycle.
    pub extra_forward_declaration: Option<String>,
}

impl Entity {
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        area: Area,
        name: impl Into<String>,
        code: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let mut ids = BTreeSet::new();
        ids.insert(name.clone());
        Entity {
            id,
            kind,
            area,
            name,
            code: code.into(),
            ids,
            tags: tags.into(),
            extra_forward_declaration: None,
        }
    }

    /// Builder helper: enum constants are additional defined identifiers.
    pub fn with_extra_ids(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        self.ids.extend(extra);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_priority_matches_documented_order() {
        let order = [
            EntityKind::Macro,
            EntityKind::Enum,
            EntityKind::Typedef,
            EntityKind::Struct,
            EntityKind::Global,
            EntityKind::Declaration,
            EntityKind::Function,
        ];
        for (i, k) in order.iter().enumerate() {
            assert_eq!(k.kind_priority(), (i + 1) as u8);
        }
    }

    #[test]
    fn enum_entity_exposes_constants_as_ids() {
        let e = Entity::new(EntityId(1), EntityKind::Enum, Area::Module, "Color", "enum Color { RED, GREEN };", "enum Color { RED, GREEN };")
            .with_extra_ids(["RED".to_string(), "GREEN".to_string()]);
        assert!(e.ids.contains("Color"));
        assert!(e.ids.contains("RED"));
        assert!(e.ids.contains("GREEN"));
    }
}
