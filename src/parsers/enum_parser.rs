//! `enum [NAME] { CONSTANTS };` extraction. Anonymous enums get a
//! synthetic per-body name so they still have a single vertex identity;
//! their constants are always indexable regardless, including the
//! "anonymous enum nested inside a struct" boundary case.

use crate::entity::{Area, Entity, EntityKind, IdAllocator};
use crate::util::{matching_close, scan_ident};

pub fn parse(body: &str, area: Area, ids: &mut IdAllocator) -> Vec<Entity> {
    let mut out = Vec::new();
    let bytes = body.as_bytes();
    let mut search_from = 0;
    while let Some(rel) = body[search_from..].find("enum") {
        let kw_start = search_from + rel;
        let kw_end = kw_start + 4;
        let before_ok = kw_start == 0 || !is_ident_byte(bytes[kw_start - 1]);
        let after_ok = kw_end >= bytes.len() || !is_ident_byte(bytes[kw_end]);
        if !before_ok || !after_ok {
            search_from = kw_end;
            continue;
        }

        let mut pos = kw_end;
        pos += leading_ws(&body[pos..]);
        let tag_name = scan_ident(body, pos).map(|(n, end)| {
            pos = end + leading_ws(&body[end..]);
            n.to_string()
        });

        if bytes.get(pos) != Some(&b'{') {
            // `enum foo bar;` (a variable declaration, not a definition) —
            // not our construct, move past the keyword and keep scanning.
            search_from = kw_end;
            continue;
        }

        let Some(body_end) = matching_close(body, pos, b'{', b'}') else {
            search_from = kw_end;
            continue;
        };
        let semi_end = body[body_end..].find(';').map(|i| body_end + i + 1).unwrap_or(body_end);
        let full_text = &body[kw_start..semi_end];
        let constants_text = &body[pos + 1..body_end - 1];
        let constants = split_constants(constants_text);

        let id = ids.next();
        let name = tag_name.unwrap_or_else(|| format!("__anon_enum_{}", id.0));
        let entity = Entity::new(id, EntityKind::Enum, area, name, full_text.to_string(), full_text.to_string())
            .with_extra_ids(constants);
        out.push(entity);

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

fn split_constants(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i <= bytes.len() {
        let at_end = i == bytes.len();
        let is_sep = !at_end && bytes[i] == b',' && depth == 0;
        if at_end || is_sep {
            let item = text[start..i].trim();
            if let Some((name, _)) = scan_ident(item, 0) {
                names.push(name.to_string());
            }
            start = i + 1;
        } else if !at_end {
            match bytes[i] {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                _ => {}
            }
        }
        i += 1;
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_enum_indexes_constants() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("enum Color { RED, GREEN, BLUE };\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Color");
        assert!(out[0].ids.contains("RED"));
        assert!(out[0].ids.contains("GREEN"));
        assert!(out[0].ids.contains("BLUE"));
    }

    #[test]
    fn anonymous_enum_gets_synthetic_name_but_real_constants() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("enum { FOO = 1, BAR = 2 };\n", Area::Module, &mut ids);
        assert_eq!(out.len(), 1);
        assert!(out[0].name.starts_with("__anon_enum_"));
        assert!(out[0].ids.contains("FOO"));
        assert!(out[0].ids.contains("BAR"));
    }

    #[test]
    fn constants_with_explicit_values_and_expressions() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("enum Flags { A = 1 << 0, B = (1 << 1) };\n", Area::Module, &mut ids);
        assert!(out[0].ids.contains("A"));
        assert!(out[0].ids.contains("B"));
    }

    #[test]
    fn enum_variable_declaration_is_not_a_definition() {
        let mut ids = IdAllocator::for_area(Area::Module);
        let out = parse("enum Color c;\n", Area::Module, &mut ids);
        assert!(out.is_empty());
    }
}
