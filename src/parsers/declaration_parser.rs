//! `extern [inline] RET NAME(ARGS);` extraction. Declarations
//! only apply to the kernel area — the module's own extern prototypes are
//! module-internal call sites, not vertices we need a declaration for.

use crate::entity::{Area, Entity, EntityKind, IdAllocator};
use crate::util::{matching_close, scan_ident_before, split_top_level_statements};

pub fn parse(body: &str, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    if area != Area::Kernel {
        return Vec::new();
    }
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for (start, end) in split_top_level_statements(body) {
        let stmt = body[start..end].trim();
        if !stmt.starts_with("extern") || !stmt.ends_with(';') || stmt.ends_with("};") {
            continue;
        }
        let Some(paren) = top_level_paren(stmt) else { continue };
        let adjacent_ident = paren > 0 && is_ident_byte(stmt.as_bytes()[paren - 1]);
        if !adjacent_ident {
            // `extern int foo;` — a variable, not a function prototype.
            continue;
        }
        let Some(close) = matching_close(stmt, paren, b'(', b')') else { continue };
        if stmt[close..].trim() != ";" {
            continue;
        }
        let Some(name) = scan_ident_before(stmt, paren) else { continue };
        let name = name.to_string();
        if seen.insert(name.clone()) {
            out.push(Entity::new(ids.next(), EntityKind::Declaration, area, name, stmt.to_string(), stmt.to_string()));
        } else {
            log::warn!("duplicate extern declaration '{name}', keeping first occurrence");
        }
    }
    out
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
    fn plain_extern_prototype() {
        let mut ids = IdAllocator::for_area(Area::Kernel);
        let out = parse("extern int kmalloc_trace(size_t size);\n", Area::Kernel, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "kmalloc_trace");
    }

    #[test]
    fn extern_inline_prototype() {
        let mut ids = IdAllocator::for_area(Area::Kernel);
        let out = parse("extern inline void might_sleep(void);\n", Area::Kernel, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "might_sleep");
    }

    #[test]
    fn extern_variable_is_not_a_declaration() {
        let mut ids = IdAllocator::for_area(Area::Kernel);
        let out = parse("extern int jiffies;\n", Area::Kernel, &mut ids);
        assert!(out.is_empty());
    }

    #[test]
    fn module_area_never_produces_declarations() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("extern int foo(void);\n", Area::Module, &mut ids);
        assert!(out.is_empty());
    }
}
