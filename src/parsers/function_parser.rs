//! Function-definition extraction. Recursive brace balancing
//! covers both the argument list and the body; a leading identifier that
//! matches a C keyword (`if (...) { ... }`, `while (...) { ... }`) is
//! rejected so a top-level compound statement never gets mistaken for a
//! function — those don't occur at file scope in valid C, but a
//! misparsed escrow restore could still produce one.

use crate::entity::{Area, Entity, EntityKind, IdAllocator};
use crate::util::{is_c_keyword, matching_close, scan_ident_before, split_top_level_statements};

pub fn parse(body: &str, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for (start, end) in split_top_level_statements(body) {
        let stmt = &body[start..end];
        let trimmed = stmt.trim();
        if trimmed.is_empty() || trimmed.ends_with(';') {
            // Prototype, global, or struct/enum/union definition — not us.
            continue;
        }
        let Some(name) = extract_function_name(trimmed) else { continue };
        if seen.insert(name.clone()) {
            out.push(Entity::new(ids.next(), EntityKind::Function, area, name, trimmed.to_string(), trimmed.to_string()));
        } else {
            log::warn!("duplicate function '{name}' in {area} area, keeping first occurrence");
        }
    }
    out
}

fn extract_function_name(stmt: &str) -> Option<String> {
    let paren = top_level_paren(stmt)?;
    let bytes = stmt.as_bytes();
    if paren == 0 || !is_ident_byte(bytes[paren - 1]) {
        return None;
    }
    let name = scan_ident_before(stmt, paren)?;
    if is_c_keyword(name) {
        return None;
    }
    let args_close = matching_close(stmt, paren, b'(', b')')?;
    let after = &stmt[args_close..];
    let body_offset = after.find(|c| c == '{' || c == ';')?;
    if after.as_bytes()[body_offset] != b'{' {
        // A terminating `;` before any `{` means this is a prototype.
        return None;
    }
    Some(name.to_string())
}

fn top_level_paren(stmt: &str) -> Option<usize> {
    let bytes = stmt.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => {
                if depth == 0 {
                    return Some(i);
                }
                depth += 1;
            }
            b')' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_function() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("int add(int a, int b) { return a + b; }\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "add");
        assert_eq!(out[0].kind, EntityKind::Function);
    }

    #[test]
    fn nested_braces_in_body() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let src = "int f(void) { if (1) { return 2; } return 0; }\n";
        let out = parse(src, Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "f");
    }

    #[test]
    fn prototype_is_not_a_definition() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("int add(int a, int b);\n", Area::Module, &mut ids);
        assert!(out.is_empty());
    }

    #[test]
    fn attribute_between_args_and_body_is_skipped() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let src = "void noret(void) __attribute__((noreturn)) { for (;;) ; }\n";
        let out = parse(src, Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "noret");
    }
}
