//! Component E: turns the parsed entity sets into a `Graph` by walking
//! the meta-graph (`metagraph.rs`) edge by edge.
//!
//! For each meta-edge `(areaS, kindS) -> [(areaT, kindT), ...]`, every
//! entity matching the source pair is checked against every entity
//! matching one of the target pairs: if any identifier the source
//! *defines* (`s.ids`) shows up as a whole-word token in the target's
//! `tags`, an edge `s -> t` is added. This is the same `O(|S| * |T|)`
//! nested scan the teacher's `build.rs` uses when it matches x-macro
//! invocations against the x-macro's own argument list.

use std::collections::BTreeMap;

use crate::entity::{Area, Entity, EntityId, EntityKind};
use crate::graph::Graph;
use crate::metagraph::META_GRAPH;
use crate::util::contains_word;

/// Builds the full cross-reference graph over every parsed entity.
/// Vertices are added for every entity regardless of whether any edge
/// ever touches them — an isolated vertex (e.g. an unreferenced kernel
/// macro) is a legal, if useless, member of the graph.
pub fn build(entities: &BTreeMap<EntityId, Entity>) -> Graph {
    let mut graph = Graph::new();
    for &id in entities.keys() {
        graph.add_vertex(id);
    }

    let mut by_pair: BTreeMap<(Area, EntityKind), Vec<&Entity>> = BTreeMap::new();
    for entity in entities.values() {
        by_pair.entry((entity.area, entity.kind)).or_default().push(entity);
    }

    for meta_edge in META_GRAPH {
        let Some(sources) = by_pair.get(&meta_edge.from) else { continue };
        let targets: Vec<&Entity> = meta_edge
            .to
            .iter()
            .filter_map(|pair| by_pair.get(pair))
            .flat_map(|v| v.iter().copied())
            .collect();
        if targets.is_empty() {
            continue;
        }
        for &s in sources {
            for &t in &targets {
                if s.id == t.id {
                    // A self-loop is only meaningful for same-entity
                    // recursion (handled below via t == s further up the
                    // same kind); skip the degenerate single-vertex case
                    // where nothing distinguishes source from target.
                    if references(s, s) {
                        graph.add_edge(s.id, s.id);
                    }
                    continue;
                }
                if references(s, t) {
                    graph.add_edge(s.id, t.id);
                }
            }
        }
    }
    graph
}

/// Whether `target` textually refers to any identifier `source` defines.
fn references(source: &Entity, target: &Entity) -> bool {
    source.ids.iter().any(|id| contains_word(&target.tags, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::IdAllocator;

    fn entity(kind: EntityKind, area: Area, name: &str, code: &str, tags: &str, ids: &mut IdAllocator) -> Entity {
        Entity::new(ids.next(), kind, area, name, code, tags)
    }

    #[test]
    fn struct_referenced_by_function_gets_an_edge() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let s = entity(EntityKind::Struct, Area::Module, "S", "struct S { int x; };", "struct S { int x; };", &mut ids);
        let f = entity(
            EntityKind::Function,
            Area::Module,
            "f",
            "int f(struct S *p){return p->x;}",
            "int f(struct S *p){return p->x;}",
            &mut ids,
        );
        let s_id = s.id;
        let f_id = f.id;
        let mut entities = BTreeMap::new();
        entities.insert(s_id, s);
        entities.insert(f_id, f);

        let graph = build(&entities);
        assert!(graph.successors(s_id).contains(&f_id));
    }

    #[test]
    fn unrelated_entities_get_no_edge() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let g1 = entity(EntityKind::Global, Area::Module, "a", "int a;", "int a;", &mut ids);
        let g2 = entity(EntityKind::Global, Area::Module, "b", "int b;", "int b;", &mut ids);
        let g1_id = g1.id;
        let g2_id = g2.id;
        let mut entities = BTreeMap::new();
        entities.insert(g1_id, g1);
        entities.insert(g2_id, g2);

        let graph = build(&entities);
        assert!(graph.successors(g1_id).is_empty());
        assert!(graph.successors(g2_id).is_empty());
    }

    #[test]
    fn direct_recursion_adds_a_self_loop() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let f = entity(
            EntityKind::Function,
            Area::Module,
            "fact",
            "int fact(int n){return n*fact(n-1);}",
            "int fact(int n){return n*fact(n-1);}",
            &mut ids,
        );
        let id = f.id;
        let mut entities = BTreeMap::new();
        entities.insert(id, f);

        let graph = build(&entities);
        assert!(graph.successors(id).contains(&id));
    }

    #[test]
    fn kernel_entities_never_get_edges_into_kernel_from_module() {
        let mut ids_k = IdAllocator::for_area(Area::Kernel);
        let mut ids_m = IdAllocator::for_area(Area::Module);
        let kfree = entity(EntityKind::Declaration, Area::Kernel, "kfree", "extern void kfree(void*);", "extern void kfree(void*);", &mut ids_k);
        let h = entity(EntityKind::Function, Area::Module, "h", "void h(void *p){kfree(p);}", "void h(void *p){kfree(p);}", &mut ids_m);
        let kfree_id = kfree.id;
        let h_id = h.id;
        let mut entities = BTreeMap::new();
        entities.insert(kfree_id, kfree);
        entities.insert(h_id, h);

        let graph = build(&entities);
        assert!(graph.successors(kfree_id).contains(&h_id));
        assert!(graph.successors(h_id).is_empty());
    }
}
