//! `modslice slice` — the primary subcommand: extract, slice, and emit.
//! Reads the two text inputs from disk, runs the pipeline, and writes
//! either four files or one concatenated file to `--out`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::emitter::EmitOptions;
use crate::pipeline::{self, CacheConfig};

#[derive(Parser, Debug)]
#[command(about = "Extract the minimal C slice needed to compile one or more module functions")]
pub struct Cli {
    /// Function name(s) to slice toward, comma-separated
    #[arg(long, value_delimiter = ',', required = true)]
    target: Vec<String>,

    /// Preprocessed module source text
    #[arg(long, value_name = "FILE")]
    module_text: PathBuf,

    /// Kernel header/macro text the module pulls in
    #[arg(long, value_name = "FILE")]
    kernel_macros: PathBuf,

    /// Directory to write output files into (ignored with --single-file,
    /// which writes `module.c` there instead)
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    /// Emit one concatenated module.c instead of four files
    #[arg(long)]
    single_file: bool,

    /// Emit non-target module functions as prototypes only
    #[arg(long)]
    elide_bodies: bool,

    /// Drop unused constants from kept enums (see DESIGN.md for the
    /// documented limits of this flag's semantics)
    #[arg(long)]
    remove_unused_enum_fields: bool,

    /// Write the sliced graph as Graphviz dot text next to the output
    #[arg(long)]
    dump_graph_dot: bool,

    /// Directory used for the level-1/level-2 memoisation cache; omit to
    /// always parse and rebuild from scratch
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

pub fn run(cli: Cli) -> Result<()> {
    let module_text = std::fs::read_to_string(&cli.module_text)
        .with_context(|| format!("reading {}", cli.module_text.display()))?;
    let kernel_text = std::fs::read_to_string(&cli.kernel_macros)
        .with_context(|| format!("reading {}", cli.kernel_macros.display()))?;

    let opts = EmitOptions {
        single_file: cli.single_file,
        elide_non_target_function_bodies: cli.elide_bodies,
        remove_unused_enum_fields: cli.remove_unused_enum_fields,
    };

    std::fs::create_dir_all(&cli.out).with_context(|| format!("creating {}", cli.out.display()))?;
    let cache = cli.cache_dir.as_deref().map(|dir| CacheConfig { dir });

    if cli.dump_graph_dot {
        let (entities, graph) = pipeline::parse_and_build_graph(&module_text, &kernel_text);
        let dot = graph_to_dot(&entities, &graph);
        let dot_path = cli.out.join("slice.dot");
        std::fs::write(&dot_path, dot).with_context(|| format!("writing {}", dot_path.display()))?;
    }

    let output = pipeline::run(&module_text, &kernel_text, &cli.target, opts, cache)?;

    if cli.single_file {
        let path = cli.out.join("module.c");
        std::fs::write(&path, output.single_file.unwrap_or_default())
            .with_context(|| format!("writing {}", path.display()))?;
    } else {
        write_file(&cli.out, "module.c", &output.module_c)?;
        write_file(&cli.out, "module.h", &output.module_h)?;
        write_file(&cli.out, "kernel.h", &output.kernel_h)?;
        write_file(&cli.out, "extern.h", &output.extern_h)?;
    }

    Ok(())
}

fn write_file(dir: &std::path::Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
}

fn graph_to_dot(
    entities: &std::collections::BTreeMap<crate::entity::EntityId, crate::entity::Entity>,
    graph: &crate::graph::Graph,
) -> String {
    let mut out = String::from("digraph slice {\n");
    for id in graph.vertices() {
        let name = entities.get(&id).map(|e| e.name.as_str()).unwrap_or("?");
        out.push_str(&format!("  n{} [label=\"{}\"];\n", id.0, name));
    }
    for id in graph.vertices() {
        for succ in graph.successors(id) {
            out.push_str(&format!("  n{} -> n{};\n", id.0, succ.0));
        }
    }
    out.push_str("}\n");
    out
}
