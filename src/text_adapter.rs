//! Escrows comments, string/char literals, attribute annotations, and
//! preprocessor macro lines out of a C source blob so the regex-grade
//! entity parsers never match inside one, then restores them at
//! emission time.
//!
//! The placeholder alphabet (`SENTINEL`) is a control byte that cannot
//! appear in ordinary C source, so it survives every downstream string
//! scan unchanged — the same property the teacher leans on in
//! `bch_bindgen/build.rs` when it stitches auto-generated Rust source
//! back together from extracted x-macro fragments.

use std::collections::HashMap;

const SENTINEL: char = '\u{1}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscrowClass {
    Comment,
    StringLiteral,
    Attribute,
    MacroLine,
}

impl EscrowClass {
    fn tag(self) -> char {
        match self {
            EscrowClass::Comment => 'C',
            EscrowClass::StringLiteral => 'S',
            EscrowClass::Attribute => 'A',
            EscrowClass::MacroLine => 'M',
        }
    }

    fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'C' => Some(EscrowClass::Comment),
            'S' => Some(EscrowClass::StringLiteral),
            'A' => Some(EscrowClass::Attribute),
            'M' => Some(EscrowClass::MacroLine),
            _ => None,
        }
    }

    fn all() -> [EscrowClass; 4] {
        [
            EscrowClass::Comment,
            EscrowClass::StringLiteral,
            EscrowClass::Attribute,
            EscrowClass::MacroLine,
        ]
    }
}

/// Text with every escrow class substituted by a placeholder, plus the
/// index -> original-substring tables needed to reverse it.
#[derive(Debug, Clone, Default)]
pub struct AdaptedText {
    pub body: String,
    escrows: HashMap<EscrowClass, Vec<String>>,
}

impl AdaptedText {
    fn push(&mut self, class: EscrowClass, original: String) -> String {
        let table = self.escrows.entry(class).or_default();
        let index = table.len();
        table.push(original);
        format!("{SENTINEL}{}{}{SENTINEL}", class.tag(), index)
    }

    pub fn table(&self, class: EscrowClass) -> &[String] {
        self.escrows.get(&class).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Fully reverses every escrow class, producing text byte-identical
    /// to the original input to `adapt`.
    pub fn restore_all(&self) -> String {
        self.restore(&self.body)
    }

    /// Restores every escrow class found in `text` (which need not be
    /// `self.body` — the emitter restores per-bucket accumulated text).
    /// Iterates to a fixed point: an escrowed macro line can itself
    /// contain a comment placeholder from an earlier pass, so one sweep
    /// is not always enough.
    pub fn restore(&self, text: &str) -> String {
        let mut current = text.to_string();
        for _ in 0..8 {
            if !current.contains(SENTINEL) {
                break;
            }
            current = self.restore_one_pass(&current);
        }
        current
    }

    /// Restores only the macro-line placeholders, leaving comments,
    /// strings and attributes escrowed. The macro parser needs `#define`
    /// text visible but still benefits from comments/strings being
    /// hidden so a `/*` or a quoted `#` inside a macro body can't be
    /// mistaken for a new directive.
    pub fn with_macro_lines_restored(&self) -> String {
        self.restore_classes(&self.body, &[EscrowClass::MacroLine])
    }

    fn restore_one_pass(&self, text: &str) -> String {
        self.restore_classes(text, &EscrowClass::all())
    }

    /// Absorbs every escrow placeholder referenced in `text` from
    /// `source`'s tables into `self`'s own tables, returning `text` with
    /// each placeholder rewritten to the index it was given in `self`.
    /// Used to fold text adapted independently of `self` (e.g. one
    /// kernel macro fragment adapted on its own) into an accumulator
    /// `AdaptedText` that will later `restore` the whole blob in one
    /// pass — without this, a placeholder from `source`'s tables would
    /// have no matching entry in `self` and could never be resolved.
    pub fn import(&mut self, text: &str, source: &AdaptedText) -> String {
        let mut out = String::with_capacity(text.len());
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == SENTINEL {
                if let Some(end) = find_sentinel_end(&chars, i) {
                    let tag = chars[i + 1];
                    let digits: String = chars[i + 2..end].iter().collect();
                    if let (Some(class), Ok(index)) = (EscrowClass::from_tag(tag), digits.parse::<usize>())
                    {
                        if let Some(original) = source.escrows.get(&class).and_then(|t| t.get(index)) {
                            out.push_str(&self.push(class, original.clone()));
                            i = end + 1;
                            continue;
                        }
                    }
                }
            }
            out.push(chars[i]);
            i += 1;
        }
        out
    }

    fn restore_classes(&self, text: &str, classes: &[EscrowClass]) -> String {
        let mut out = String::with_capacity(text.len());
        let bytes: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == SENTINEL {
                if let Some(end) = find_sentinel_end(&bytes, i) {
                    let tag = bytes[i + 1];
                    let digits: String = bytes[i + 2..end].iter().collect();
                    if let (Some(class), Ok(index)) = (EscrowClass::from_tag(tag), digits.parse::<usize>())
                    {
                        if classes.contains(&class) {
                            if let Some(original) = self.escrows.get(&class).and_then(|t| t.get(index)) {
                                out.push_str(original);
                                i = end + 1;
                                continue;
                            }
                        }
                    }
                }
            }
            out.push(bytes[i]);
            i += 1;
        }
        out
    }
}

fn find_sentinel_end(bytes: &[char], start: usize) -> Option<usize> {
    bytes[start + 1..].iter().position(|&c| c == SENTINEL).map(|p| start + 1 + p)
}

/// Runs the full adaptation pipeline: comments+strings (scanned jointly,
/// since a comment marker inside a string literal must not be treated as
/// a comment), then attributes, then macro lines.
pub fn adapt(text: &str) -> AdaptedText {
    let mut out = AdaptedText::default();
    let stripped = strip_comments_and_strings(text, &mut out);
    let stripped = strip_attributes(&stripped, &mut out);
    let stripped = strip_macro_lines(&stripped, &mut out);
    out.body = stripped;
    out
}

fn strip_comments_and_strings(text: &str, out: &mut AdaptedText) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            let start = i;
            let mut j = i + 2;
            loop {
                if j >= chars.len() {
                    break;
                }
                if chars[j] == '\\' && chars.get(j + 1) == Some(&'\n') {
                    j += 2;
                    continue;
                }
                if chars[j] == '\n' {
                    break;
                }
                j += 1;
            }
            let original: String = chars[start..j].iter().collect();
            result.push_str(&out.push(EscrowClass::Comment, original));
            i = j;
        } else if c == '/' && chars.get(i + 1) == Some(&'*') {
            let start = i;
            let mut j = i + 2;
            while j + 1 < chars.len() && !(chars[j] == '*' && chars[j + 1] == '/') {
                j += 1;
            }
            let end = (j + 2).min(chars.len());
            let original: String = chars[start..end].iter().collect();
            result.push_str(&out.push(EscrowClass::Comment, original));
            i = end;
        } else if c == '"' || c == '\'' {
            let quote = c;
            let start = i;
            let mut j = i + 1;
            while j < chars.len() {
                if chars[j] == '\\' && j + 1 < chars.len() {
                    j += 2;
                    continue;
                }
                if chars[j] == quote {
                    j += 1;
                    break;
                }
                j += 1;
            }
            let original: String = chars[start..j].iter().collect();
            result.push_str(&out.push(EscrowClass::StringLiteral, original));
            i = j;
        } else {
            result.push(c);
            i += 1;
        }
    }
    result
}

const BARE_ATTRIBUTES: &[&str] = &["__attribute_const__", "CONSTF"];
const PAREN_ATTRIBUTES: &[&str] = &["__attribute__", "__acquires", "__releases"];

fn strip_attributes(text: &str, out: &mut AdaptedText) -> String {
    let mut result = text.to_string();
    for name in PAREN_ATTRIBUTES {
        result = strip_paren_attribute(&result, name, out);
    }
    for name in BARE_ATTRIBUTES {
        result = strip_bare_attribute(&result, name, out);
    }
    result
}

fn strip_paren_attribute(text: &str, name: &str, out: &mut AdaptedText) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        match rest.find(name) {
            None => {
                result.push_str(rest);
                break;
            }
            Some(pos) => {
                result.push_str(&rest[..pos]);
                let after_name = pos + name.len();
                let tail = &rest[after_name..];
                let open_offset = tail.find(|c: char| !c.is_whitespace());
                match open_offset {
                    Some(off) if tail.as_bytes().get(off) == Some(&b'(') => {
                        match crate::util::matching_close(tail, off, b'(', b')') {
                            Some(close_end) => {
                                let original = &rest[pos..after_name + close_end];
                                result.push_str(&out.push(EscrowClass::Attribute, original.to_string()));
                                rest = &rest[after_name + close_end..];
                            }
                            None => {
                                result.push_str(&rest[pos..after_name]);
                                rest = &rest[after_name..];
                            }
                        }
                    }
                    _ => {
                        result.push_str(&rest[pos..after_name]);
                        rest = &rest[after_name..];
                    }
                }
            }
        }
    }
    result
}

fn strip_bare_attribute(text: &str, name: &str, out: &mut AdaptedText) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        match rest.find(name) {
            None => {
                result.push_str(rest);
                break;
            }
            Some(pos) => {
                result.push_str(&rest[..pos]);
                let end = pos + name.len();
                result.push_str(&out.push(EscrowClass::Attribute, rest[pos..end].to_string()));
                rest = &rest[end..];
            }
        }
    }
    result
}

fn strip_macro_lines(text: &str, out: &mut AdaptedText) -> String {
    let mut result = String::new();
    let mut lines = text.split_inclusive('\n').peekable();
    while let Some(mut line) = lines.next() {
        if line.trim_start().starts_with('#') {
            let mut original = String::new();
            loop {
                original.push_str(line);
                let continues = line.trim_end_matches('\n').ends_with('\\');
                if !continues {
                    break;
                }
                match lines.next() {
                    Some(next) => line = next,
                    None => break,
                }
            }
            let placeholder = out.push(EscrowClass::MacroLine, original);
            result.push_str(&placeholder);
        } else {
            result.push_str(line);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_comments_strings_attributes_macros() {
        let src = "#define K 3\n\
/* a comment */ int x = 1; // trailing\n\
const char *s = \"a # not a directive\";\n\
void f(void) __attribute__((noreturn));\n";
        let adapted = adapt(src);
        assert!(!adapted.body.contains("/*"));
        assert!(!adapted.body.contains("//"));
        assert!(!adapted.body.contains("#define"));
        assert!(!adapted.body.contains("__attribute__"));
        assert_eq!(adapted.restore_all(), src);
    }

    #[test]
    fn line_continuation_extends_macro() {
        let src = "#define FOO(x) \\\n    ((x) + 1)\nint g(void) { return FOO(1); }\n";
        let adapted = adapt(src);
        assert!(!adapted.body.contains("#define"));
        assert!(adapted.body.contains("int g(void)"));
        assert_eq!(adapted.restore_all(), src);
    }

    #[test]
    fn comment_marker_inside_string_is_not_a_comment() {
        let src = "char *s = \"/* not a comment */\";\nint y = 2;\n";
        let adapted = adapt(src);
        // The whole string literal is escrowed as one unit, so no bare
        // comment placeholder should appear from its contents.
        assert_eq!(adapted.table(EscrowClass::Comment).len(), 0);
        assert_eq!(adapted.restore_all(), src);
    }

    #[test]
    fn macro_lines_can_be_selectively_restored() {
        let src = "#define K 3\nint g(void){return K;}\n";
        let adapted = adapt(src);
        let partial = adapted.with_macro_lines_restored();
        assert!(partial.contains("#define K 3"));
    }

    #[test]
    fn import_folds_independently_adapted_text_into_an_accumulator() {
        let fragment_src = "#define K(p)/*a*//*b*/ kfree(p)\n";
        let fragment_adapted = adapt(fragment_src);
        let escrowed_directive = fragment_adapted.table(EscrowClass::MacroLine)[0].clone();

        let mut accumulator = AdaptedText::default();
        let imported = accumulator.import(&escrowed_directive, &fragment_adapted);
        assert_eq!(accumulator.restore(&imported), fragment_src);
    }

    #[test]
    fn import_handles_adjacent_placeholders_with_no_gap_between_them() {
        // Two comments back to back produce two escrow placeholders with
        // zero characters between them; import must not panic on that.
        let fragment_src = "/*a*//*b*/x\n";
        let fragment_adapted = adapt(fragment_src);
        let mut accumulator = AdaptedText::default();
        let imported = accumulator.import(&fragment_adapted.body, &fragment_adapted);
        assert_eq!(accumulator.restore(&imported), fragment_src);
    }
}
