//! Component B: the seven entity parsers, one per construct kind this
//! crate recognises. Each parser takes an already-adapted
//! (escrowed) text body for one area and returns the `Entity` values it
//! finds; `pipeline` runs all seven over both the kernel and module text
//! and unions the results before graph construction.

pub mod declaration_parser;
pub mod enum_parser;
pub mod function_parser;
pub mod global_parser;
pub mod macro_parser;
pub mod struct_parser;
pub mod typedef_parser;

use crate::entity::{Area, Entity, IdAllocator};
use crate::text_adapter::AdaptedText;

/// Runs all seven parsers over one area's adapted text. The six non-macro
/// parsers scan the fully escrowed body — comments, strings, attributes
/// *and* macro lines are all inert placeholder tokens to them, so a stray
/// `#define`'s braces or semicolons can never perturb their depth
/// counting. The macro parser instead reads the escrow table directly
/// (see `macro_parser::parse`), since the macro-line text itself is what
/// it needs to see.
pub fn parse_all(adapted: &AdaptedText, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    let body = &adapted.body;
    let mut out = Vec::new();
    out.extend(macro_parser::parse(adapted, area, ids));
    out.extend(typedef_parser::parse(body, area, ids));
    out.extend(enum_parser::parse(body, area, ids));
    out.extend(struct_parser::parse(body, area, ids));
    out.extend(global_parser::parse(body, area, ids));
    out.extend(declaration_parser::parse(body, area, ids));
    out.extend(function_parser::parse(body, area, ids));
    out
}
