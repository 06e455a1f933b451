//! Component F: predecessor closure plus the cycle-resolution policies.
//! Target resolution and the kind-pair rules below are deliberately
//! concrete, following the worked scenarios for which edge gets dropped
//! in each kind of cycle rather than a looser prose summary of the
//! policy.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::entity::{Area, Entity, EntityId, EntityKind};
use crate::error::SliceError;
use crate::graph::Graph;

pub struct SlicedGraph {
    pub graph: Graph,
    /// Entities within the slice, with any `extra_forward_declaration`
    /// the cycle breaker attached.
    pub entities: BTreeMap<EntityId, Entity>,
}

/// Resolves `target_names` (module-area function names) to vertex ids.
/// Fails fast on an empty list or a name the module doesn't define.
pub fn resolve_targets(
    entities: &BTreeMap<EntityId, Entity>,
    target_names: &[String],
) -> Result<BTreeSet<EntityId>, SliceError> {
    if target_names.is_empty() {
        return Err(SliceError::InputError("no target functions specified".into()));
    }
    let mut out = BTreeSet::new();
    for name in target_names {
        let found = entities
            .values()
            .find(|e| e.area == Area::Module && e.kind == EntityKind::Function && &e.name == name);
        match found {
            Some(e) => {
                out.insert(e.id);
            }
            None => return Err(SliceError::InputError(format!("target function '{name}' not found in module"))),
        }
    }
    Ok(out)
}

/// Runs the full slice: predecessor closure, subgraph induction, then
/// cycle resolution until the induced graph is acyclic.
pub fn slice(
    entities: &BTreeMap<EntityId, Entity>,
    graph: &Graph,
    targets: &BTreeSet<EntityId>,
) -> Result<SlicedGraph, SliceError> {
    let closure = graph.predecessor_closure(targets);
    let mut sliced = graph.induced_subgraph(&closure);
    let mut sliced_entities: BTreeMap<EntityId, Entity> =
        closure.iter().map(|&id| (id, entities[&id].clone())).collect();

    resolve_cycles(&mut sliced, &mut sliced_entities)?;

    Ok(SlicedGraph { graph: sliced, entities: sliced_entities })
}

fn resolve_cycles(graph: &mut Graph, entities: &mut BTreeMap<EntityId, Entity>) -> Result<(), SliceError> {
    loop {
        let sccs = graph.strongly_connected_components();
        let mut broke_one = false;
        for group in sccs {
            if group.len() == 1 {
                let v = group[0];
                if graph.successors(v).contains(&v) {
                    graph.remove_edge(v, v);
                    broke_one = true;
                }
                continue;
            }

            if group.len() == 2 {
                let a = group[0];
                let b = group[1];
                if resolve_pair(graph, entities, a, b)? {
                    broke_one = true;
                    continue;
                }
                return Err(unresolvable(entities, &group));
            }

            if group.iter().all(|v| entities[v].kind == EntityKind::Function) {
                resolve_function_chain(graph, entities, &group);
                broke_one = true;
                continue;
            }

            return Err(unresolvable(entities, &group));
        }
        if !broke_one {
            break;
        }
    }
    Ok(())
}

/// Attempts the three two-vertex policies. Returns `Ok(true)` if handled.
fn resolve_pair(
    graph: &mut Graph,
    entities: &mut BTreeMap<EntityId, Entity>,
    a: EntityId,
    b: EntityId,
) -> Result<bool, SliceError> {
    let ka = entities[&a].kind;
    let kb = entities[&b].kind;

    if ka == EntityKind::Function && kb == EntityKind::Function {
        resolve_function_pair(graph, entities, a, b);
        return Ok(true);
    }

    if ka == kb && matches!(ka, EntityKind::Struct | EntityKind::Macro | EntityKind::Typedef) {
        // Same-kind self-cycle: either edge can go, C's forward-reference
        // rules for incomplete types cover the rest. Drop the one
        // pointing at the higher id for a deterministic result.
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        graph.remove_edge(hi, lo);
        return Ok(true);
    }

    let (typedef_id, struct_id) = match (ka, kb) {
        (EntityKind::Typedef, EntityKind::Struct) => (a, b),
        (EntityKind::Struct, EntityKind::Typedef) => (b, a),
        _ => return Ok(false),
    };
    // The struct must be emitted first; its typedef naturally follows.
    // Drop the edge that runs from the typedef (the one forcing the
    // opposite order), keeping struct -> typedef.
    graph.remove_edge(typedef_id, struct_id);
    Ok(true)
}

/// Two mutually recursive functions: the one with the lower id ("the
/// first function") keeps its position; the other gets forward-declared
/// and attached to it, and the edge that would force the other order is
/// dropped.
fn resolve_function_pair(graph: &mut Graph, entities: &mut BTreeMap<EntityId, Entity>, a: EntityId, b: EntityId) {
    let (first, second) = if a < b { (a, b) } else { (b, a) };
    graph.remove_edge(second, first);
    let proto = function_prototype(&entities[&second].code);
    if let Some(e) = entities.get_mut(&first) {
        e.extra_forward_declaration = Some(proto);
    }
}

/// Generalises the two-function policy to a longer all-Function SCC:
/// anchor on the lowest id, forward-declare every other member onto it,
/// and drop each edge that ran from that member into the anchor.
fn resolve_function_chain(graph: &mut Graph, entities: &mut BTreeMap<EntityId, Entity>, group: &[EntityId]) {
    let anchor = *group.iter().min().unwrap();
    let mut declarations = Vec::new();
    for &member in group {
        if member == anchor {
            continue;
        }
        if graph.successors(member).contains(&anchor) {
            graph.remove_edge(member, anchor);
        }
        declarations.push(function_prototype(&entities[&member].code));
    }
    declarations.sort();
    if let Some(e) = entities.get_mut(&anchor) {
        e.extra_forward_declaration = Some(declarations.join("\n"));
    }
}

/// Extracts `RET NAME(ARGS);` from a function definition's code by
/// taking everything up to the first top-level `{`. Also used by the
/// emitter for `--elide-bodies`.
pub(crate) fn function_prototype(code: &str) -> String {
    let bytes = code.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth -= 1,
            b'{' if depth == 0 => {
                let header = code[..i].trim_end();
                return format!("{header};");
            }
            _ => {}
        }
    }
    format!("{};", code.trim_end())
}

fn unresolvable(entities: &BTreeMap<EntityId, Entity>, group: &[EntityId]) -> SliceError {
    let path = group.iter().map(|id| format!("{}({})", entities[id].name, entities[id].kind)).collect();
    SliceError::UnresolvableCycle { message: "cycle of mixed kinds has no resolution policy".into(), path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::IdAllocator;

    fn make(kind: EntityKind, area: Area, name: &str, code: &str, ids: &mut IdAllocator) -> Entity {
        Entity::new(ids.next(), kind, area, name, code, code)
    }

    #[test]
    fn mutual_recursion_forward_declares_the_second_function() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let a = make(EntityKind::Function, Area::Module, "a", "int a(void){return b();}", &mut ids);
        let b = make(EntityKind::Function, Area::Module, "b", "int b(void){return a();}", &mut ids);
        let a_id = a.id;
        let b_id = b.id;
        let mut entities = BTreeMap::new();
        entities.insert(a_id, a);
        entities.insert(b_id, b);

        let mut graph = Graph::new();
        graph.add_vertex(a_id);
        graph.add_vertex(b_id);
        graph.add_edge(a_id, b_id);
        graph.add_edge(b_id, a_id);

        resolve_cycles(&mut graph, &mut entities).unwrap();

        assert!(graph.successors(a_id).contains(&b_id));
        assert!(!graph.successors(b_id).contains(&a_id));
        assert_eq!(entities[&a_id].extra_forward_declaration.as_deref(), Some("int b(void);"));
    }

    #[test]
    fn typedef_struct_cycle_keeps_struct_before_typedef() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let t = make(EntityKind::Typedef, Area::Module, "N", "typedef struct N N;", &mut ids);
        let s = make(EntityKind::Struct, Area::Module, "N", "struct N { N *next; };", &mut ids);
        let t_id = t.id;
        let s_id = s.id;
        let mut entities = BTreeMap::new();
        entities.insert(t_id, t);
        entities.insert(s_id, s);

        let mut graph = Graph::new();
        graph.add_vertex(t_id);
        graph.add_vertex(s_id);
        graph.add_edge(t_id, s_id);
        graph.add_edge(s_id, t_id);

        resolve_cycles(&mut graph, &mut entities).unwrap();

        assert!(graph.successors(s_id).contains(&t_id));
        assert!(!graph.successors(t_id).contains(&s_id));
    }

    #[test]
    fn same_kind_struct_self_cycle_drops_higher_id_edge() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let s1 = make(EntityKind::Struct, Area::Module, "A", "struct A { struct B *b; };", &mut ids);
        let s2 = make(EntityKind::Struct, Area::Module, "B", "struct B { struct A *a; };", &mut ids);
        let id1 = s1.id;
        let id2 = s2.id;
        let mut entities = BTreeMap::new();
        entities.insert(id1, s1);
        entities.insert(id2, s2);

        let mut graph = Graph::new();
        graph.add_vertex(id1);
        graph.add_vertex(id2);
        graph.add_edge(id1, id2);
        graph.add_edge(id2, id1);

        resolve_cycles(&mut graph, &mut entities).unwrap();
        assert_eq!(graph.successors(id1).len() + graph.successors(id2).len(), 1);
    }

    #[test]
    fn self_loop_is_silently_dropped() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let f = make(EntityKind::Function, Area::Module, "fact", "int fact(int n){return n*fact(n-1);}", &mut ids);
        let id = f.id;
        let mut entities = BTreeMap::new();
        entities.insert(id, f);

        let mut graph = Graph::new();
        graph.add_vertex(id);
        graph.add_edge(id, id);

        resolve_cycles(&mut graph, &mut entities).unwrap();
        assert!(!graph.successors(id).contains(&id));
    }

    #[test]
    fn mixed_kind_cycle_with_no_policy_is_fatal() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let f = make(EntityKind::Function, Area::Module, "f", "int f(void){return M;}", &mut ids);
        let m = make(EntityKind::Macro, Area::Module, "M", "#define M f()", &mut ids);
        let f_id = f.id;
        let m_id = m.id;
        let mut entities = BTreeMap::new();
        entities.insert(f_id, f);
        entities.insert(m_id, m);

        let mut graph = Graph::new();
        graph.add_vertex(f_id);
        graph.add_vertex(m_id);
        graph.add_edge(f_id, m_id);
        graph.add_edge(m_id, f_id);

        let err = resolve_cycles(&mut graph, &mut entities).unwrap_err();
        assert!(matches!(err, SliceError::UnresolvableCycle { .. }));
    }

    #[test]
    fn resolve_targets_rejects_empty_list() {
        let entities = BTreeMap::new();
        let err = resolve_targets(&entities, &[]).unwrap_err();
        assert!(matches!(err, SliceError::InputError(_)));
    }

    #[test]
    fn resolve_targets_rejects_unknown_function() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let f = make(EntityKind::Function, Area::Module, "f", "int f(void){return 0;}", &mut ids);
        let mut entities = BTreeMap::new();
        entities.insert(f.id, f);
        let err = resolve_targets(&entities, &["missing".to_string()]).unwrap_err();
        assert!(matches!(err, SliceError::InputError(_)));
    }
}
