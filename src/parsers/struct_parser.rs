//! `struct|union [NAME] { ... };` extraction with recursive brace
//! balancing.

use crate::entity::{Area, Entity, EntityKind, IdAllocator};
use crate::util::{matching_close, scan_ident};

const KEYWORDS: [&str; 2] = ["struct", "union"];

pub fn parse(body: &str, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    let mut out = Vec::new();
    for kw in KEYWORDS {
        out.extend(parse_keyword(body, kw, area, ids));
    }
    out
}

fn parse_keyword(body: &str, keyword: &str, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    let mut out = Vec::new();
    let bytes = body.as_bytes();
    let mut search_from = 0;
    while let Some(rel) = body[search_from..].find(keyword) {
        let kw_start = search_from + rel;
        let kw_end = kw_start + keyword.len();
        let before_ok = kw_start == 0 || !is_ident_byte(bytes[kw_start - 1]);
        let after_ok = kw_end >= bytes.len() || !is_ident_byte(bytes[kw_end]);
        if !before_ok || !after_ok {
            search_from = kw_end;
            continue;
        }

        let mut pos = kw_end + leading_ws(&body[kw_end..]);
        let tag_name = scan_ident(body, pos).map(|(n, end)| {
            pos = end + leading_ws(&body[end..]);
            n.to_string()
        });

        if bytes.get(pos) != Some(&b'{') {
            // Forward declaration (`struct foo;`) or a variable of this
            // type (`struct foo bar;`) — not a definition.
            search_from = kw_end;
            continue;
        }

        let Some(body_end) = matching_close(body, pos, b'{', b'}') else {
            search_from = kw_end;
            continue;
        };
        let semi_end = body[body_end..].find(';').map(|i| body_end + i + 1).unwrap_or(body_end);
        let full_text = &body[kw_start..semi_end];

        let Some(name) = tag_name else {
            // Anonymous struct/union with no typedef attached to it here
            // isn't independently addressable; the surrounding typedef
            // parser (or an enclosing struct's member list) owns it.
            search_from = semi_end.max(kw_end);
            continue;
        };

        out.push(Entity::new(
            ids.next(),
            EntityKind::Struct,
            area,
            name,
            full_text.to_string(),
            full_text.to_string(),
        ));
        search_from = semi_end.max(kw_end);
    }
    out
}

fn leading_ws(s: &str) -> usize {
    s.as_bytes().iter().take_while(|b| b.is_ascii_whitespace()).count()
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_struct() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("struct S { int x; };\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "S");
        assert_eq!(out[0].kind, EntityKind::Struct);
    }

    #[test]
    fn nested_braces_balanced() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let src = "struct Outer { struct { int a; } inner; int b; };\n";
        let out = parse(src, Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Outer");
        assert!(out[0].code.contains("int b;"));
    }

    #[test]
    fn union_is_recognised() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("union U { int i; float f; };\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "U");
    }

    #[test]
    fn forward_declaration_is_not_a_definition() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("struct S;\nstruct S *p;\n", Area::Module, &mut ids);
        assert!(out.is_empty());
    }
}
