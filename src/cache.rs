//! Component L: versioned `serde_json` memoisation blob for the two
//! cacheable stages of the pipeline — the parsed entity sets (level 1)
//! and the fully built graph (level 2) — so a re-run over an unchanged
//! kernel tree can skip components A-E.
//!
//! Written atomically: serialise to a sibling `.tmp` file, then rename
//! over the real path, the same two-step the teacher uses for its own
//! on-disk superblock rewrites.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::graph::Graph;

/// Bumped whenever the on-disk shape changes; a mismatch discards the
/// cache instead of trying to migrate it.
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CachedEntities {
    version: u32,
    source_hash: u64,
    entities: Vec<Entity>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedGraph {
    version: u32,
    source_hash: u64,
    vertices: Vec<EntityId>,
    edges: Vec<(EntityId, EntityId)>,
}

/// FNV-1a 64-bit over the raw source text, used only to notice that the
/// cached blob no longer matches today's input; not a security hash.
pub fn source_hash(text: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for byte in text.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Level 1: the parsed entity sets, keyed by id. Returns `None` on a
/// missing file, a version mismatch, or a source-hash mismatch — all
/// three mean "rebuild this stage".
pub fn load_entities(path: &Path, expected_hash: u64) -> Option<BTreeMap<EntityId, Entity>> {
    let raw = std::fs::read_to_string(path).ok()?;
    let cached: CachedEntities = serde_json::from_str(&raw).ok()?;
    if cached.version != CACHE_VERSION {
        log::debug!("entity cache at {} is version {}, expected {CACHE_VERSION}; ignoring", path.display(), cached.version);
        return None;
    }
    if cached.source_hash != expected_hash {
        log::debug!("entity cache at {} no longer matches its source text; ignoring", path.display());
        return None;
    }
    Some(cached.entities.into_iter().map(|e| (e.id, e)).collect())
}

pub fn store_entities(path: &Path, source_hash: u64, entities: &BTreeMap<EntityId, Entity>) -> Result<()> {
    let cached = CachedEntities { version: CACHE_VERSION, source_hash, entities: entities.values().cloned().collect() };
    write_atomically(path, &cached)
}

/// Level 2: the fully built graph, as an edge list (a `Graph`'s internal
/// `HashMap`s don't round-trip through `serde_json` as map keys, since
/// JSON object keys must be strings; the edge-list form sidesteps that).
pub fn load_graph(path: &Path, expected_hash: u64) -> Option<Graph> {
    let raw = std::fs::read_to_string(path).ok()?;
    let cached: CachedGraph = serde_json::from_str(&raw).ok()?;
    if cached.version != CACHE_VERSION {
        log::debug!("graph cache at {} is version {}, expected {CACHE_VERSION}; ignoring", path.display(), cached.version);
        return None;
    }
    if cached.source_hash != expected_hash {
        log::debug!("graph cache at {} no longer matches its source text; ignoring", path.display());
        return None;
    }
    let mut graph = Graph::new();
    for id in cached.vertices {
        graph.add_vertex(id);
    }
    for (from, to) in cached.edges {
        graph.add_edge(from, to);
    }
    Some(graph)
}

pub fn store_graph(path: &Path, source_hash: u64, graph: &Graph) -> Result<()> {
    let vertices: Vec<EntityId> = graph.vertices().collect();
    let mut edges = Vec::new();
    for &v in &vertices {
        for &succ in graph.successors(v) {
            edges.push((v, succ));
        }
    }
    let cached = CachedGraph { version: CACHE_VERSION, source_hash, vertices, edges };
    write_atomically(path, &cached)
}

fn write_atomically<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let body = serde_json::to_string(value).context("serialising cache blob")?;
    std::fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Area, EntityKind, IdAllocator};

    #[test]
    fn entity_cache_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");
        let mut ids = IdAllocator::for_area(Area::Module);
        let e = Entity::new(ids.next(), EntityKind::Global, Area::Module, "x", "int x;", "int x;");
        let mut entities = BTreeMap::new();
        entities.insert(e.id, e);
        let hash = source_hash("int x;");

        store_entities(&path, hash, &entities).unwrap();
        let loaded = load_entities(&path, hash).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.values().next().unwrap().name, "x");
    }

    #[test]
    fn version_mismatch_forces_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");
        std::fs::write(&path, r#"{"version":999,"source_hash":0,"entities":[]}"#).unwrap();
        assert!(load_entities(&path, 0).is_none());
    }

    #[test]
    fn changed_source_forces_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");
        let entities: BTreeMap<EntityId, Entity> = BTreeMap::new();
        store_entities(&path, source_hash("old text"), &entities).unwrap();
        assert!(load_entities(&path, source_hash("new text")).is_none());
    }

    #[test]
    fn graph_cache_round_trips_edges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let mut graph = Graph::new();
        graph.add_vertex(EntityId(1));
        graph.add_vertex(EntityId(2));
        graph.add_edge(EntityId(1), EntityId(2));
        let hash = source_hash("whatever");

        store_graph(&path, hash, &graph).unwrap();
        let loaded = load_graph(&path, hash).unwrap();
        assert!(loaded.successors(EntityId(1)).contains(&EntityId(2)));
    }
}
