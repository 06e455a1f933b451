//! `typedef ... NAME;`, `typedef ... (*NAME)(...);`, and
//! `typedef struct ... NAME;` extraction.

use crate::entity::{Area, Entity, EntityKind, IdAllocator};
use crate::util::{scan_ident, scan_ident_before};

pub fn parse(body: &str, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    let mut search_from = 0;
    while let Some(rel) = body[search_from..].find("typedef") {
        let kw_start = search_from + rel;
        let kw_end = kw_start + "typedef".len();
        // reject matches inside a longer identifier, e.g. "my_typedef_thing"
        if !word_boundary(body, kw_start, kw_end) {
            search_from = kw_end;
            continue;
        }
        match capture_statement_end(body, kw_end) {
            Some(stmt_end) => {
                let statement = &body[kw_start..stmt_end];
                if let Some(name) = extract_typedef_name(&body[kw_end..stmt_end]) {
                    if seen.insert(name.to_string()) {
                        out.push(Entity::new(
                            ids.next(),
                            EntityKind::Typedef,
                            area,
                            name.to_string(),
                            statement.to_string(),
                            statement.to_string(),
                        ));
                    } else {
                        log::warn!("duplicate typedef '{name}' in {area} area, keeping first occurrence");
                    }
                }
                search_from = stmt_end;
            }
            None => break,
        }
    }
    out
}

fn word_boundary(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    let before_ok = start == 0 || !is_ident_byte(bytes[start - 1]);
    let after_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
    before_ok && after_ok
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Scans forward from `start` to the first top-level `;`, respecting
/// brace/paren nesting so a struct body's internal statements don't
/// terminate the scan early.
fn capture_statement_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'(' | b'[' => depth += 1,
            b'}' | b')' | b']' => depth -= 1,
            b';' if depth == 0 => return Some(i + 1),
            _ => {}
        }
        i += 1;
    }
    None
}

fn extract_typedef_name(rest: &str) -> Option<&str> {
    // Function-pointer form: `... (*NAME)(...)`.
    if let Some(star_pos) = rest.find("(*") {
        let after_star = star_pos + 2;
        if let Some((name, _)) = scan_ident(rest, after_star) {
            return Some(name);
        }
    }
    // Otherwise the name is the last identifier before the terminating ';'.
    let trimmed_end = rest.trim_end().trim_end_matches(';');
    scan_ident_before(trimmed_end, trimmed_end.len())
}
