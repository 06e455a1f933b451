//! Component D: the fixed `(Area,Kind) -> [(Area,Kind)]` schema.
//! Kernel entities may be pulled into the module slice;
//! module entities never pull kernel entities back in, since the
//! external preprocessor has already resolved what the module uses from
//! the kernel. Functions never produce types, so there is no
//! `function -> struct` edge.

use crate::entity::{Area, EntityKind};

/// One `(source area, source kind) -> (target area, target kind)`
/// adjacency list entry.
pub struct MetaEdge {
    pub from: (Area, EntityKind),
    pub to: &'static [(Area, EntityKind)],
}

use Area::{Kernel, Module};
use EntityKind::{Declaration, Enum, Function, Global, Macro, Struct, Typedef};

pub const META_GRAPH: &[MetaEdge] = &[
    MetaEdge {
        from: (Kernel, Macro),
        to: &[
            (Kernel, Macro), (Kernel, Struct), (Kernel, Typedef), (Kernel, Enum), (Kernel, Declaration), (Kernel, Global),
            (Module, Macro), (Module, Struct), (Module, Function), (Module, Typedef), (Module, Enum),
        ],
    },
    MetaEdge {
        from: (Kernel, Struct),
        to: &[
            (Kernel, Macro), (Kernel, Struct), (Kernel, Declaration), (Kernel, Typedef), (Kernel, Global),
            (Module, Macro), (Module, Struct), (Module, Function), (Module, Typedef), (Module, Global),
        ],
    },
    MetaEdge {
        from: (Kernel, Declaration),
        to: &[(Kernel, Macro), (Module, Macro), (Module, Function)],
    },
    MetaEdge {
        from: (Kernel, Typedef),
        to: &[
            (Kernel, Macro), (Kernel, Struct), (Kernel, Declaration), (Kernel, Typedef), (Kernel, Enum), (Kernel, Global),
            (Module, Macro), (Module, Struct), (Module, Function), (Module, Typedef), (Module, Enum), (Module, Global),
        ],
    },
    MetaEdge {
        from: (Kernel, Enum),
        to: &[
            (Kernel, Macro), (Kernel, Struct), (Kernel, Declaration), (Kernel, Typedef), (Kernel, Enum), (Kernel, Global),
            (Module, Macro), (Module, Struct), (Module, Function), (Module, Typedef), (Module, Enum), (Module, Global),
        ],
    },
    MetaEdge {
        from: (Kernel, Global),
        to: &[(Kernel, Macro), (Module, Macro), (Module, Function)],
    },
    MetaEdge {
        from: (Module, Macro),
        to: &[(Module, Macro), (Module, Struct), (Module, Function), (Module, Typedef), (Module, Enum)],
    },
    MetaEdge {
        from: (Module, Struct),
        to: &[(Module, Macro), (Module, Struct), (Module, Function), (Module, Typedef), (Module, Global)],
    },
    MetaEdge {
        from: (Module, Function),
        to: &[(Module, Macro), (Module, Function)],
    },
    MetaEdge {
        from: (Module, Typedef),
        to: &[(Module, Macro), (Module, Struct), (Module, Function), (Module, Typedef), (Module, Enum), (Module, Global)],
    },
    MetaEdge {
        from: (Module, Enum),
        to: &[(Module, Macro), (Module, Struct), (Module, Function), (Module, Typedef), (Module, Enum), (Module, Global)],
    },
    MetaEdge {
        from: (Module, Global),
        to: &[(Module, Macro), (Module, Function)],
    },
];

/// Returns the declared targets for a `(area, kind)` source, or an empty
/// slice if that source never appears on the left of an edge (e.g.
/// `Module, Declaration` — the module's own extern prototypes are never
/// modelled as dependency sources, only module `Function`s consume them
/// indirectly through the kernel side).
pub fn targets_of(from: (Area, EntityKind)) -> &'static [(Area, EntityKind)] {
    META_GRAPH.iter().find(|e| e.from == from).map(|e| e.to).unwrap_or(&[])
}
