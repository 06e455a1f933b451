//! File-scope global-variable extraction. Excludes function
//! prototypes and `extern`-prefixed declarations — those are either not
//! modeled (plain module prototypes) or become `Declaration` entities
//! (kernel `extern` function prototypes, see `declaration_parser`).

use crate::entity::{Area, Entity, EntityKind, IdAllocator};
use crate::util::{scan_ident, split_top_level_statements};

const TYPE_KEYWORDS: &[&str] = &[
    "static", "const", "volatile", "extern", "register", "unsigned", "signed",
    "int", "char", "long", "short", "float", "double", "void", "struct",
    "union", "enum", "inline", "restrict", "_Bool", "bool", "typedef",
];

pub fn parse(body: &str, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for (start, end) in split_top_level_statements(body) {
        let stmt = body[start..end].trim();
        if stmt.is_empty() {
            continue;
        }
        if !stmt.ends_with(';') || stmt.ends_with("};") {
            // Either a brace-terminated function/struct/enum body (no
            // semicolon, or already consumed with its own `;` — handled
            // by their own parsers), skip.
            continue;
        }
        if stmt.starts_with("typedef")
            || stmt.starts_with("struct")
            || stmt.starts_with("union")
            || stmt.starts_with("enum")
            || stmt.starts_with("extern")
        {
            continue;
        }
        if is_prototype(stmt) {
            continue;
        }
        let Some(name) = declarator_name(stmt) else { continue };
        if seen.insert(name.clone()) {
            out.push(Entity::new(ids.next(), EntityKind::Global, area, name, stmt.to_string(), stmt.to_string()));
        } else {
            log::warn!("duplicate global '{name}' in {area} area, keeping first occurrence");
        }
    }
    out
}

fn is_prototype(stmt: &str) -> bool {
    let bytes = stmt.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => {
                if depth == 0 {
                    let adjacent_ident = i > 0 && is_ident_byte(bytes[i - 1]);
                    if !adjacent_ident {
                        return false;
                    }
                    let Some(close) = crate::util::matching_close(stmt, i, b'(', b')') else {
                        return false;
                    };
                    let remainder = stmt[close..].trim();
                    return remainder == ";";
                }
                depth += 1;
            }
            b')' => depth -= 1,
            _ => {}
        }
    }
    false
}

fn declarator_name(stmt: &str) -> Option<String> {
    let cutoff = find_cutoff(stmt);
    let prefix = &stmt[..cutoff];
    let mut last = None;
    let mut i = 0;
    while i < prefix.len() {
        if let Some((ident, end)) = scan_ident(prefix, i) {
            if !TYPE_KEYWORDS.contains(&ident) {
                last = Some(ident.to_string());
            }
            i = end;
        } else {
            i += 1;
        }
    }
    last
}

fn find_cutoff(stmt: &str) -> usize {
    let bytes = stmt.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'{' => depth += 1,
            b')' | b'}' => depth -= 1,
            b'=' | b'[' if depth == 0 => return i,
            b';' if depth == 0 => return i,
            _ => {}
        }
    }
    bytes.len()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_global_with_initialiser() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("static int counter = 0;\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "counter");
    }

    #[test]
    fn global_without_initialiser() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("int g_flag;\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "g_flag");
    }

    #[test]
    fn array_global() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("static const char table[4] = { 1, 2, 3, 4 };\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "table");
    }

    #[test]
    fn function_prototype_is_excluded() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("int add(int a, int b);\n", Area::Module, &mut ids);
        assert!(out.is_empty());
    }

    #[test]
    fn extern_prefixed_is_excluded() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("extern int shared_counter;\n", Area::Module, &mut ids);
        assert!(out.is_empty());
    }

    #[test]
    fn function_pointer_global_is_kept() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("int (*fp)(void);\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "fp");
    }
}
