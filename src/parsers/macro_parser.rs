//! `#define NAME(args) body` / `#define NAME body` extraction. Runs over
//! the macro-line escrow table the text adapter built — each table
//! entry is already one complete directive (continuation lines joined)
//! with its own comments/strings/attributes escrowed.

use crate::entity::{Area, Entity, EntityKind, IdAllocator};
use crate::text_adapter::{self, AdaptedText, EscrowClass};
use crate::util::scan_ident;

/// Parses every `#define` directive found in `adapted`'s macro-line table.
pub fn parse(adapted: &AdaptedText, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for fragment in adapted.table(EscrowClass::MacroLine) {
        if let Some(entity) = entity_from_directive(fragment, area, ids) {
            if !seen.insert(entity.name.clone()) {
                log::warn!("duplicate macro '{}' in {area} area, keeping first occurrence", entity.name);
                continue;
            }
            out.push(entity);
        }
    }
    out
}

/// Parses the kernel's already-tokenised `#define` list. Each fragment is
/// independently comment/string escrowed first, since it didn't go through
/// the module's text adapter — the escrow entries that produces are folded
/// into `kernel_adapted` via `AdaptedText::import` so the placeholders left
/// in the resulting entity's `code`/`tags` stay resolvable once `emit`
/// restores against `kernel_adapted` later in the pipeline.
pub fn parse_kernel_macro_list(
    fragments: &[String],
    kernel_adapted: &mut AdaptedText,
    ids: &mut IdAllocator,
) -> Vec<Entity> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for raw in fragments {
        let fragment_adapted = text_adapter::adapt(raw);
        let escrowed = fragment_adapted
            .table(EscrowClass::MacroLine)
            .first()
            .cloned()
            .unwrap_or_else(|| raw.clone());
        let imported = kernel_adapted.import(&escrowed, &fragment_adapted);
        if let Some(entity) = entity_from_directive(&imported, Area::Kernel, ids) {
            if !seen.insert(entity.name.clone()) {
                log::warn!("duplicate kernel macro '{}', keeping first occurrence", entity.name);
                continue;
            }
            out.push(entity);
        }
    }
    out
}

fn entity_from_directive(directive: &str, area: Area, ids: &mut IdAllocator) -> Option<Entity> {
    let trimmed = directive.trim_start();
    let after_hash = trimmed.strip_prefix('#')?.trim_start();
    let after_define = after_hash.strip_prefix("define")?;
    if after_define.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_') {
        // e.g. "defined" or "definex" — not the `define` keyword.
        return None;
    }
    let after_define = after_define.trim_start();
    let (name, _after_name) = scan_ident(after_define, 0)?;
    let name = name.to_string();

    Some(Entity::new(
        ids.next(),
        EntityKind::Macro,
        area,
        name,
        directive.to_string(),
        directive.to_string(),
    ))
}
