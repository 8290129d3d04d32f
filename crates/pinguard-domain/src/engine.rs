use crate::extract::extract_reference;
use crate::model::{Decision, Evaluation};
use crate::policy::Policy;
use crate::report::Diagnostic;
use crate::rewrite::rewrite_line;

/// What happened to one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not a declaration line.
    NoMatch,
    /// Local or container reference; no diagnostic.
    Skipped,
    Evaluated {
        decision: Decision,
        column: usize,
        /// New line content for REPLACE decisions.
        rewritten: Option<String>,
    },
}

/// Run extractor, policy engine and rewriter over a single line.
pub fn evaluate_line(line: &str, policy: &Policy) -> LineOutcome {
    let Some(decl) = extract_reference(line) else {
        return LineOutcome::NoMatch;
    };

    let decision = match policy.evaluate(decl.value) {
        Evaluation::Skip => return LineOutcome::Skipped,
        Evaluation::Decided(decision) => decision,
    };

    let rewritten = match &decision {
        Decision::Replace {
            reference,
            replacement,
        } => rewrite_line(line, &reference.identity, replacement),
        _ => None,
    };

    LineOutcome::Evaluated {
        decision,
        column: decl.value_start,
        rewritten,
    }
}

/// Evaluate every line in order, replacing REPLACE lines in place.
///
/// Returns one diagnostic per evaluated reference. Line count and order never change.
pub fn process_lines(lines: &mut [String], policy: &Policy) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (line_index, line) in lines.iter_mut().enumerate() {
        let LineOutcome::Evaluated {
            decision,
            column,
            rewritten,
        } = evaluate_line(line, policy)
        else {
            continue;
        };

        if let Some(new_line) = rewritten {
            *line = new_line;
        }
        diagnostics.push(Diagnostic {
            line_index,
            column,
            decision,
        });
    }

    diagnostics
}

/// Result of processing a whole workflow document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    pub changed: bool,
}

impl DocumentOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.decision.is_error())
    }

    pub fn replaced(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.decision, Decision::Replace { .. }))
            .count()
    }
}

/// Process a document, keeping each line's terminator (`\n`, `\r\n`, or none on the last line).
///
/// A document without REPLACE decisions comes back byte-identical.
pub fn rewrite_document(text: &str, policy: &Policy) -> DocumentOutcome {
    let (mut lines, terminators): (Vec<String>, Vec<&str>) =
        text.split_inclusive('\n').map(split_terminator).unzip();

    let diagnostics = process_lines(&mut lines, policy);

    let mut out = String::with_capacity(text.len());
    for (line, terminator) in lines.iter().zip(&terminators) {
        out.push_str(line);
        out.push_str(terminator);
    }

    DocumentOutcome {
        changed: out != text,
        text: out,
        diagnostics,
    }
}

fn split_terminator(raw: &str) -> (String, &str) {
    let terminator_len = if raw.ends_with("\r\n") {
        2
    } else if raw.ends_with('\n') {
        1
    } else {
        0
    };
    let (content, terminator) = raw.split_at(raw.len() - terminator_len);
    (content.to_string(), terminator)
}
