use crate::extract::extract_reference;
use crate::model::Replacement;

/// Separator written between a hash pin and its display tag.
pub const ANNOTATION_PREFIX: &str = " # ";

/// Substitute `identity@revision` for the declaration's value.
///
/// Everything before the value is kept byte-for-byte. Without a display tag the rest of the
/// line is kept too. With one, any trailing comment is replaced by ` # <tag>`; the comment
/// sits behind whitespace so a later scan never reads it as part of the value.
///
/// Returns `None` when `line` is not a declaration line.
pub fn rewrite_line(line: &str, identity: &str, replacement: &Replacement) -> Option<String> {
    let decl = extract_reference(line)?;
    let remainder = &line[decl.value_end..];

    let mut out = String::with_capacity(line.len() + replacement.revision.len());
    out.push_str(&line[..decl.value_start]);
    out.push_str(&replacement.expression(identity));

    match replacement.display_tag.as_deref() {
        Some(tag) => {
            out.push_str(strip_comment(remainder).trim_end());
            out.push_str(ANNOTATION_PREFIX);
            out.push_str(tag);
        }
        None => out.push_str(remainder),
    }

    Some(out)
}

/// Cut a trailing YAML comment: `#` at the start or preceded by whitespace.
fn strip_comment(text: &str) -> &str {
    let mut prev_is_space = true;
    for (idx, c) in text.char_indices() {
        if c == '#' && prev_is_space {
            return &text[..idx];
        }
        prev_is_space = c.is_whitespace();
    }
    text
}
