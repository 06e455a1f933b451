//! Component G: topological drain of the sliced graph into the output
//! buckets. Six text accumulators exist internally (kernel and module
//! each split into a macro section and the rest) but collapse to the
//! four output files this crate writes.

use std::collections::{BTreeSet, HashSet};

use crate::entity::{Area, Entity, EntityId, EntityKind};
use crate::error::SliceError;
use crate::graph::Graph;
use crate::slicer::{function_prototype, SlicedGraph};
use crate::text_adapter::AdaptedText;

#[derive(Debug, Clone, Copy, Default)]
pub struct EmitOptions {
    pub single_file: bool,
    pub elide_non_target_function_bodies: bool,
    /// Accepted for interface compatibility; the precise semantics for
    /// rewriting constant values were never pinned down, so this is a
    /// documented no-op — see DESIGN.md.
    pub remove_unused_enum_fields: bool,
}

#[derive(Debug, Default)]
pub struct EmitOutput {
    pub kernel_h: String,
    pub extern_h: String,
    pub module_h: String,
    pub module_c: String,
    /// Populated only in single-file mode.
    pub single_file: Option<String>,
}

struct Buckets {
    kernel_macro: String,
    module_macro: String,
    kernel: String,
    extern_h: String,
    module_h: String,
    module_c: String,
}

impl Buckets {
    fn new() -> Self {
        Buckets {
            kernel_macro: String::new(),
            module_macro: String::new(),
            kernel: String::new(),
            extern_h: String::new(),
            module_h: String::new(),
            module_c: String::new(),
        }
    }

    fn target_mut(&mut self, area: Area, kind: EntityKind) -> &mut String {
        match (area, kind) {
            (Area::Kernel, EntityKind::Macro) => &mut self.kernel_macro,
            (Area::Kernel, EntityKind::Declaration | EntityKind::Global) => &mut self.extern_h,
            (Area::Kernel, EntityKind::Typedef | EntityKind::Enum | EntityKind::Struct) => &mut self.kernel,
            (Area::Module, EntityKind::Function) => &mut self.module_c,
            (Area::Module, EntityKind::Macro) => &mut self.module_macro,
            (Area::Module, _) => &mut self.module_h,
            (Area::Kernel, EntityKind::Function) => &mut self.kernel,
        }
    }
}

pub fn emit(
    sliced: &SlicedGraph,
    targets: &BTreeSet<EntityId>,
    kernel_adapted: &AdaptedText,
    module_adapted: &AdaptedText,
    opts: EmitOptions,
) -> Result<EmitOutput, SliceError> {
    let ordered = drain(sliced)?;

    let mut buckets = Buckets::new();
    for entity in &ordered {
        if let Some(fwd) = &entity.extra_forward_declaration {
            buckets.target_mut(entity.area, entity.kind).push_str(fwd);
            buckets.target_mut(entity.area, entity.kind).push('\n');
        }
        let text = emitted_text(entity, targets, opts);
        buckets.target_mut(entity.area, entity.kind).push_str(&text);
        buckets.target_mut(entity.area, entity.kind).push('\n');
    }

    let kernel_h = kernel_adapted.restore(&format!("{}{}", buckets.kernel_macro, buckets.kernel));
    let extern_h = kernel_adapted.restore(&buckets.extern_h);
    let module_h = module_adapted.restore(&format!("{}{}", buckets.module_macro, buckets.module_h));
    let module_c = module_adapted.restore(&buckets.module_c);

    if opts.single_file {
        let banner = |name: &str| format!("/* ---- {name} ---- */\n");
        let mut combined = String::new();
        combined.push_str(&banner("kernel macros"));
        combined.push_str(&kernel_adapted.restore(&buckets.kernel_macro));
        combined.push_str(&banner("module macros"));
        combined.push_str(&module_adapted.restore(&buckets.module_macro));
        combined.push_str(&banner("kernel.h"));
        combined.push_str(&kernel_adapted.restore(&buckets.kernel));
        combined.push_str(&banner("extern.h"));
        combined.push_str(&extern_h);
        combined.push_str(&banner("module.h"));
        combined.push_str(&module_adapted.restore(&buckets.module_h));
        combined.push_str(&banner("module.c"));
        combined.push_str(&module_c);
        return Ok(EmitOutput { kernel_h, extern_h, module_h, module_c, single_file: Some(combined) });
    }

    let module_c_with_includes =
        format!("#include \"kernel.h\"\n#include \"extern.h\"\n#include \"module.h\"\n{module_c}");

    Ok(EmitOutput { kernel_h, extern_h, module_h, module_c: module_c_with_includes, single_file: None })
}

fn emitted_text(entity: &Entity, targets: &BTreeSet<EntityId>, opts: EmitOptions) -> String {
    if opts.elide_non_target_function_bodies
        && entity.kind == EntityKind::Function
        && entity.area == Area::Module
        && !targets.contains(&entity.id)
    {
        return function_prototype(&entity.code);
    }
    entity.code.clone()
}

/// Repeatedly drains the in-degree-zero frontier, sorted by
/// `(kind_priority, name)`, until the graph is empty. The slicer
/// guarantees acyclicity, so a non-empty graph with an empty frontier is
/// an implementation bug, not a user-facing condition.
fn drain(sliced: &SlicedGraph) -> Result<Vec<Entity>, SliceError> {
    let mut graph: Graph = sliced.graph.clone();
    let mut remaining: HashSet<EntityId> = graph.vertices().collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut frontier: Vec<EntityId> =
            remaining.iter().copied().filter(|&v| graph.in_degree(v) == 0).collect();
        if frontier.is_empty() {
            return Err(SliceError::GraphInvariantBreach(
                "emitter reached a non-empty graph with no in-degree-zero vertex; the slicer should have made this acyclic".into(),
            ));
        }
        frontier.sort_by(|&a, &b| {
            let ea = &sliced.entities[&a];
            let eb = &sliced.entities[&b];
            ea.kind.kind_priority().cmp(&eb.kind.kind_priority()).then_with(|| ea.name.cmp(&eb.name))
        });
        for v in frontier {
            ordered.push(sliced.entities[&v].clone());
            remaining.remove(&v);
            graph.remove_vertex(v);
        }
    }
    Ok(ordered)
}
