//! Recognizes `uses:` declaration lines and locates the raw reference value.
//!
//! Matching is a two-step manual tokenization: a structural scan finds the keyword and its
//! colon behind indentation and list/flow markers, then the value is cut at whitespace, a
//! comment marker, or a flow delimiter. The value's shape is never validated here.

/// Declaration keyword.
pub const KEYWORD: &str = "uses";

/// The raw reference found on a declaration line, with its byte span in that line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub value: &'a str,
    /// Byte offset of the first value character (inside the quotes when quoted).
    pub value_start: usize,
    /// Byte offset one past the last value character.
    pub value_end: usize,
    pub quote: Option<char>,
}

/// Structural predicate: does this line declare an external reference?
pub fn declares_reference(line: &str) -> bool {
    extract_reference(line).is_some()
}

/// Extract the raw reference expression, or `None` when the line is not a declaration.
pub fn extract_reference(line: &str) -> Option<Declaration<'_>> {
    let after_colon = keyword_end(line)?;
    let rest = &line[after_colon..];
    let value_text = rest.trim_start_matches([' ', '\t']);
    let offset = after_colon + (rest.len() - value_text.len());

    // An unterminated quote falls through to the plain scan, keeping the stray quote in the
    // value so the reference is reported as malformed.
    if let Some(quote) = value_text.chars().next().filter(|c| is_quote(*c)) {
        let inner = &value_text[1..];
        if let Some(len) = inner.find(quote) {
            if len == 0 {
                return None;
            }
            let value_start = offset + 1;
            return Some(Declaration {
                value: &inner[..len],
                value_start,
                value_end: value_start + len,
                quote: Some(quote),
            });
        }
    }

    let len = value_text
        .find(|c: char| c.is_whitespace() || is_value_terminator(c))
        .unwrap_or(value_text.len());
    if len == 0 {
        return None;
    }
    Some(Declaration {
        value: &value_text[..len],
        value_start: offset,
        value_end: offset + len,
        quote: None,
    })
}

/// Byte offset just past `uses:`, when only indentation and structure markers precede it.
fn keyword_end(line: &str) -> Option<usize> {
    let prefix_len = line
        .find(|c: char| !is_structure_marker(c))
        .unwrap_or(line.len());
    let rest = line[prefix_len..].strip_prefix(KEYWORD)?.strip_prefix(':')?;
    Some(line.len() - rest.len())
}

/// Comment marker and flow-collection delimiters never belong to a reference value.
fn is_value_terminator(c: char) -> bool {
    matches!(c, '#' | ',' | '}' | ']')
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Characters at which a scan of a plain or quoted value would stop.
///
/// Text written into a declaration must avoid them, or the next scan reads a shorter value.
pub fn cuts_value(c: char) -> bool {
    c.is_whitespace() || is_value_terminator(c) || is_quote(c)
}

fn is_structure_marker(c: char) -> bool {
    matches!(c, ' ' | '\t' | '-' | '?' | '{' | '[' | ',')
}
