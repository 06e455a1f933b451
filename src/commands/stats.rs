//! `modslice stats` — dry-run parse + graph-build with no slicing, for
//! sanity-checking a kernel tree's text before committing to a real
//! slice, modeled on the teacher's read-only `counters`/`fs_usage`
//! reporting commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use strum::IntoEnumIterator;

use crate::entity::{Area, EntityKind};
use crate::pipeline;

#[derive(Parser, Debug)]
#[command(about = "Report entity and edge counts after a dry-run parse and graph build")]
pub struct Cli {
    /// Preprocessed module source text
    #[arg(long, value_name = "FILE")]
    module_text: PathBuf,

    /// Kernel header/macro text the module pulls in
    #[arg(long, value_name = "FILE")]
    kernel_macros: PathBuf,
}

pub fn run(cli: Cli) -> Result<()> {
    let module_text = std::fs::read_to_string(&cli.module_text)
        .with_context(|| format!("reading {}", cli.module_text.display()))?;
    let kernel_text = std::fs::read_to_string(&cli.kernel_macros)
        .with_context(|| format!("reading {}", cli.kernel_macros.display()))?;

    let (entities, graph) = pipeline::parse_and_build_graph(&module_text, &kernel_text);

    let mut by_area_kind: BTreeMap<(Area, EntityKind), usize> = BTreeMap::new();
    for entity in entities.values() {
        *by_area_kind.entry((entity.area, entity.kind)).or_default() += 1;
    }

    println!("entities: {}", entities.len());
    for area in Area::iter() {
        for kind in EntityKind::iter() {
            let count = by_area_kind.get(&(area, kind)).copied().unwrap_or(0);
            if count > 0 {
                println!("  {area}.{kind}: {count}");
            }
        }
    }

    let edge_count: usize = graph.vertices().map(|v| graph.successors(v).len()).sum();
    println!("vertices: {}", graph.len());
    println!("edges: {edge_count}");

    Ok(())
}
