use crate::{RenderableReport, RenderableSeverity};

/// Render findings as GitHub Actions workflow command annotations.
///
/// Format:
/// `::{level} file={path},line={line},col={col}::{message}`
pub fn render_github_annotations(report: &RenderableReport) -> Vec<String> {
    let mut out = Vec::new();

    for f in &report.findings {
        let level = match f.severity {
            RenderableSeverity::Error => "error",
            RenderableSeverity::Warning => "warning",
            RenderableSeverity::Info => "notice",
        };

        let mut meta = String::new();
        if let Some(loc) = &f.location {
            meta.push_str(&format!("file={}", escape_property(&loc.path)));
            if let Some(line) = loc.line {
                meta.push_str(&format!(",line={line}"));
            }
            if let Some(col) = loc.col {
                meta.push_str(&format!(",col={col}"));
            }
        }

        let check_id = f.check_id.as_deref().unwrap_or("pinguard");
        let message = escape_data(&format!("[{check_id}:{}] {}", f.code, f.message));

        if meta.is_empty() {
            out.push(format!("::{level}::{message}"));
        } else {
            out.push(format!("::{level} {meta}::{message}"));
        }
    }

    out
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Property values additionally escape the separators of the workflow command syntax.
fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        RenderableData, RenderableFinding, RenderableLocation, RenderableVerdictStatus,
    };

    fn finding(severity: RenderableSeverity, message: &str) -> RenderableFinding {
        RenderableFinding {
            severity,
            check_id: Some("refs.pinned".to_string()),
            code: "pin_outdated".to_string(),
            message: message.to_string(),
            location: Some(RenderableLocation {
                path: ".github/workflows/ci.yml".to_string(),
                line: Some(11),
                col: Some(15),
            }),
            help: None,
            url: None,
        }
    }

    #[test]
    fn renders_levels_and_locations() {
        let mut no_location = finding(RenderableSeverity::Info, "note");
        no_location.location = None;
        no_location.check_id = None;

        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            findings: vec![
                finding(RenderableSeverity::Warning, "'actions/checkout' is outdated"),
                finding(RenderableSeverity::Error, "bad"),
                no_location,
            ],
            data: RenderableData::default(),
        };

        insta::assert_snapshot!(render_github_annotations(&report).join("\n"), @r"
        ::warning file=.github/workflows/ci.yml,line=11,col=15::[refs.pinned:pin_outdated] 'actions/checkout' is outdated
        ::error file=.github/workflows/ci.yml,line=11,col=15::[refs.pinned:pin_outdated] bad
        ::notice::[pinguard:pin_outdated] note
        ");
    }

    #[test]
    fn escapes_workflow_command_characters() {
        let mut f = finding(RenderableSeverity::Error, "100% broken\nsecond line");
        if let Some(loc) = f.location.as_mut() {
            loc.path = "dir,with:odd.yml".to_string();
        }
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            findings: vec![f],
            data: RenderableData::default(),
        };

        let lines = render_github_annotations(&report);
        assert_eq!(
            lines,
            vec![
                "::error file=dir%2Cwith%3Aodd.yml,line=11,col=15::[refs.pinned:pin_outdated] 100%25 broken%0Asecond line"
                    .to_string()
            ]
        );
    }
}
