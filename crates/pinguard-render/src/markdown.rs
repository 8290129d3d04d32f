use crate::{RenderableReport, RenderableSeverity, RenderableVerdictStatus};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Pinguard report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    let d = &report.data;
    out.push_str(&format!("- Verdict: **{verdict}**\n"));
    if !d.mode.is_empty() {
        out.push_str(&format!("- Mode: `{}`\n", d.mode));
    }
    out.push_str(&format!(
        "- Files: {} scanned, {} changed\n",
        d.files_scanned, d.files_changed
    ));
    out.push_str(&format!(
        "- References: {} scanned, {} replaced, {} failed\n",
        d.references_scanned, d.references_replaced, d.references_failed
    ));
    out.push_str(&format!(
        "- Findings: {} (emitted) / {} (total)\n\n",
        d.findings_emitted, d.findings_total
    ));

    if let Some(r) = &d.truncated_reason {
        out.push_str(&format!("> Note: {r}\n\n"));
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");

    for f in &report.findings {
        let sev = match f.severity {
            RenderableSeverity::Info => "INFO",
            RenderableSeverity::Warning => "WARN",
            RenderableSeverity::Error => "ERROR",
        };
        let check_id = f.check_id.as_deref().unwrap_or("");

        match &f.location {
            Some(loc) => out.push_str(&format!(
                "- [{sev}] `{check_id}` / `{}`: {} (`{}`:{})\n",
                f.code,
                f.message,
                loc.path,
                loc.line.unwrap_or(0)
            )),
            None => out.push_str(&format!(
                "- [{sev}] `{check_id}` / `{}`: {}\n",
                f.code, f.message
            )),
        }

        if let Some(help) = &f.help {
            out.push_str(&format!("  - help: {help}\n"));
        }
        if let Some(url) = &f.url {
            out.push_str(&format!("  - url: {url}\n"));
        }
    }

    out
}
