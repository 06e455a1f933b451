//! Component H: wires A→B→C→D/E→F→G. Owns the memoisation cache boundary
//! (component L) and the collaborator seam (component M) for a future
//! real preprocessor driver.
//!
//! Area boundary: the CLI surface takes two plain text inputs,
//! `--module-text` and `--kernel-macros`. Rather than requiring the
//! caller to thread `#line` markers through a single merged blob to tell
//! kernel-origin text apart from module text, this driver parses each
//! input file in full (all seven parsers, not just macros) and tags
//! everything from `--module-text` as `Area::Module` and everything from
//! `--kernel-macros` as `Area::Kernel`. This reproduces every worked
//! scenario (a kernel `extern` declaration, a kernel struct, a kernel
//! macro, all pulled into a module slice) from two independently
//! readable files. `run_with_driver` is the alternative entry point for
//! a collaborator that only ever hands back a literal macro list for the
//! kernel side, via `macro_parser::parse_kernel_macro_list`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::cache;
use crate::collaborators::PreprocessorDriver;
use crate::emitter::{self, EmitOptions, EmitOutput};
use crate::entity::{Area, Entity, EntityId, IdAllocator};
use crate::graphbuilder;
use crate::parsers::{self, macro_parser};
use crate::slicer;
use crate::text_adapter::{self, AdaptedText};

/// Where the level-1/level-2 memoisation blobs live, if the caller wants
/// them. Absence disables caching entirely — every run parses from
/// scratch, which is always correct, just slower.
pub struct CacheConfig<'a> {
    pub dir: &'a Path,
}

/// Runs the whole pipeline over two already-preprocessed text blobs.
pub fn run(
    module_text: &str,
    kernel_text: &str,
    targets: &[String],
    opts: EmitOptions,
    cache: Option<CacheConfig<'_>>,
) -> Result<EmitOutput> {
    let module_adapted = text_adapter::adapt(module_text);
    let kernel_adapted = text_adapter::adapt(kernel_text);

    let combined_hash = cache::source_hash(&format!("{module_text}\u{0}{kernel_text}"));
    let entities_path = cache.as_ref().map(|c| c.dir.join("entities.json"));
    let graph_path = cache.as_ref().map(|c| c.dir.join("graph.json"));

    let entities = match entities_path.as_deref().and_then(|p| cache::load_entities(p, combined_hash)) {
        Some(cached) => {
            log::debug!("reusing cached entity set ({} entities)", cached.len());
            cached
        }
        None => {
            let built = parse_both_areas(&module_adapted, &kernel_adapted);
            if let Some(path) = &entities_path {
                if let Err(e) = cache::store_entities(path, combined_hash, &built) {
                    log::warn!("failed to write entity cache: {e}");
                }
            }
            built
        }
    };

    let graph = match graph_path.as_deref().and_then(|p| cache::load_graph(p, combined_hash)) {
        Some(cached) => {
            log::debug!("reusing cached graph ({} vertices)", cached.len());
            cached
        }
        None => {
            let built = graphbuilder::build(&entities);
            if let Some(path) = &graph_path {
                if let Err(e) = cache::store_graph(path, combined_hash, &built) {
                    log::warn!("failed to write graph cache: {e}");
                }
            }
            built
        }
    };

    let target_ids = slicer::resolve_targets(&entities, targets)?;
    let sliced = slicer::slice(&entities, &graph, &target_ids)?;
    let output = emitter::emit(&sliced, &target_ids, &kernel_adapted, &module_adapted, opts)?;
    Ok(output)
}

/// Drives the pipeline through a `PreprocessorDriver` collaborator
/// instead of two plain files. The kernel side only ever contributes
/// `Macro` entities here, matching the `kernel_macro_list` collaborator
/// contract literally.
pub fn run_with_driver(
    driver: &dyn PreprocessorDriver,
    targets: &[String],
    opts: EmitOptions,
    cache: Option<CacheConfig<'_>>,
) -> Result<EmitOutput> {
    let module_text = driver.preprocessed_module_text()?;
    let macro_fragments = driver.kernel_macro_list()?;

    let module_adapted = text_adapter::adapt(&module_text);
    let mut kernel_adapted = AdaptedText::default();

    let mut module_ids = IdAllocator::for_area(Area::Module);
    let mut kernel_ids = IdAllocator::for_area(Area::Kernel);

    let mut entities: BTreeMap<EntityId, Entity> = BTreeMap::new();
    for e in parsers::parse_all(&module_adapted, Area::Module, &mut module_ids) {
        entities.insert(e.id, e);
    }
    for e in macro_parser::parse_kernel_macro_list(&macro_fragments, &mut kernel_adapted, &mut kernel_ids) {
        entities.insert(e.id, e);
    }

    let combined_hash = cache::source_hash(&format!("{module_text}\u{0}{}", macro_fragments.join("\n")));
    let graph_path = cache.as_ref().map(|c| c.dir.join("graph.json"));
    let graph = match graph_path.as_deref().and_then(|p| cache::load_graph(p, combined_hash)) {
        Some(cached) => cached,
        None => {
            let built = graphbuilder::build(&entities);
            if let Some(path) = &graph_path {
                if let Err(e) = cache::store_graph(path, combined_hash, &built) {
                    log::warn!("failed to write graph cache: {e}");
                }
            }
            built
        }
    };

    let target_ids = slicer::resolve_targets(&entities, targets)?;
    let sliced = slicer::slice(&entities, &graph, &target_ids)?;
    let output = emitter::emit(&sliced, &target_ids, &kernel_adapted, &module_adapted, opts)?;
    Ok(output)
}

/// Just components A-E: useful for the `stats` subcommand, which reports
/// counts without ever slicing.
pub fn parse_and_build_graph(module_text: &str, kernel_text: &str) -> (BTreeMap<EntityId, Entity>, crate::graph::Graph) {
    let module_adapted = text_adapter::adapt(module_text);
    let kernel_adapted = text_adapter::adapt(kernel_text);
    let entities = parse_both_areas(&module_adapted, &kernel_adapted);
    let graph = graphbuilder::build(&entities);
    (entities, graph)
}

fn parse_both_areas(module_adapted: &AdaptedText, kernel_adapted: &AdaptedText) -> BTreeMap<EntityId, Entity> {
    let mut module_ids = IdAllocator::for_area(Area::Module);
    let mut kernel_ids = IdAllocator::for_area(Area::Kernel);
    let mut entities = BTreeMap::new();
    for e in parsers::parse_all(module_adapted, Area::Module, &mut module_ids) {
        entities.insert(e.id, e);
    }
    for e in parsers::parse_all(kernel_adapted, Area::Kernel, &mut kernel_ids) {
        entities.insert(e.id, e);
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_mutual_recursion_scenario() {
        let module_text = "int a(void){return b();}\nint b(void){return a();}\n";
        let out = run(module_text, "", &["a".to_string()], EmitOptions::default(), None).unwrap();
        assert!(out.module_c.contains("int b(void);"));
        let a_pos = out.module_c.find("int a(void)").unwrap();
        let b_pos = out.module_c.find("int b(void){return a();}").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn end_to_end_kernel_declaration_scenario() {
        let kernel_text = "extern void kfree(void*);\n";
        let module_text = "void h(void *p){kfree(p);}\n";
        let out = run(module_text, kernel_text, &["h".to_string()], EmitOptions::default(), None).unwrap();
        assert!(out.extern_h.contains("extern void kfree(void*);"));
        assert!(out.module_c.contains("void h(void *p)"));
    }

    #[test]
    fn missing_target_is_an_input_error() {
        let err = run("int f(void){return 0;}\n", "", &["missing".to_string()], EmitOptions::default(), None).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    struct FixtureDriver {
        module_text: String,
        macros: Vec<String>,
    }

    impl PreprocessorDriver for FixtureDriver {
        fn preprocessed_module_text(&self) -> Result<String> {
            Ok(self.module_text.clone())
        }

        fn kernel_macro_list(&self) -> Result<Vec<String>> {
            Ok(self.macros.clone())
        }
    }

    #[test]
    fn run_with_driver_handles_comments_inside_kernel_macro_fragments() {
        let driver = FixtureDriver {
            module_text: "void h(void *p){K(p);}\n".to_string(),
            macros: vec!["#define K(p)/*a*//*b*/ kfree(p)\n".to_string()],
        };
        let out = run_with_driver(&driver, &["h".to_string()], EmitOptions::default(), None).unwrap();
        assert!(out.kernel_h.contains("#define K(p)/*a*//*b*/ kfree(p)"));
        assert!(out.module_c.contains("void h(void *p)"));
    }
}
