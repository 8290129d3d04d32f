//! CLI entry point for pinguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `pinguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use pinguard_app::{
    AnnotationsInput, CheckInput, ConfigSource, ExplainOutput, MarkdownInput, Mode,
    format_diagnostics, render_report_markdown, run_annotations, run_check, run_explain,
    run_markdown, run_policy, runtime_error_report, verdict_exit_code, write_report,
};
use pinguard_settings::Overrides;
use std::io::Write;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_CONFIG: &str = "pinguard.toml";

#[derive(Parser, Debug)]
#[command(
    name = "pinguard",
    version,
    about = "Rewrite CI workflow step references to policy-approved pins"
)]
struct Cli {
    /// Repository root (workflow roots and the config path are relative to it).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Path to the policy config TOML. Without it, `pinguard.toml` is used when present,
    /// otherwise the builtin policy.
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Override the base preset (none|builtin).
    #[arg(long)]
    preset: Option<String>,

    /// Override when the run fails (error|warning).
    #[arg(long)]
    fail_on: Option<String>,

    /// Override maximum findings to emit in the report.
    #[arg(long)]
    max_findings: Option<u32>,

    /// Log filter for stderr diagnostics (e.g. `warn`, `debug`, `pinguard_repo=trace`).
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite outdated pins in place and report every reference.
    Update(RunArgs),

    /// Report what `update` would do without writing any file.
    Check(RunArgs),

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/pinguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/pinguard/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a check_id or code with remediation guidance.
    Explain {
        /// The check_id (e.g., "refs.pinned") or code (e.g., "action_denied") to explain.
        identifier: String,
    },

    /// Print the effective policy as a standalone TOML config.
    Policy,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Where to write the JSON report (not written when omitted).
    #[arg(long)]
    report_out: Option<Utf8PathBuf>,

    /// Where to write a Markdown summary (not written when omitted).
    #[arg(long)]
    markdown_out: Option<Utf8PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match &cli.cmd {
        Commands::Update(args) => cmd_run(&cli, args, Mode::Update),
        Commands::Check(args) => cmd_run(&cli, args, Mode::Check),
        Commands::Md { report, output } => cmd_md(report, output.as_deref()),
        Commands::Annotations { report, max } => cmd_annotations(report, *max),
        Commands::Explain { identifier } => cmd_explain(identifier),
        Commands::Policy => cmd_policy(&cli),
    }
}

/// Logs go to stderr; stdout carries only diagnostics and rendered output.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn overrides(cli: &Cli) -> Overrides {
    Overrides {
        preset: cli.preset.clone(),
        fail_on: cli.fail_on.clone(),
        max_findings: cli.max_findings,
    }
}

/// Config file path and contents, or `None` for the builtin policy.
///
/// An explicit `--config` must exist; the default `pinguard.toml` is optional.
fn read_config(cli: &Cli, repo_root: &Utf8Path) -> anyhow::Result<Option<(Utf8PathBuf, String)>> {
    let (path, explicit) = match &cli.config {
        Some(p) => (repo_root.join(p), true),
        None => (repo_root.join(DEFAULT_CONFIG), false),
    };

    if !explicit && !path.exists() {
        tracing::debug!(path = %path, "no config file; using builtin policy");
        return Ok(None);
    }

    let text =
        std::fs::read_to_string(&path).with_context(|| format!("read config {path}"))?;
    Ok(Some((path, text)))
}

fn config_source<'a>(config: &'a Option<(Utf8PathBuf, String)>) -> ConfigSource<'a> {
    match config {
        Some((path, text)) => ConfigSource::File {
            path: path.as_str(),
            text,
        },
        None => ConfigSource::Builtin,
    }
}

fn resolve_repo_root(cli: &Cli) -> Utf8PathBuf {
    cli.repo_root
        .canonicalize_utf8()
        .unwrap_or_else(|_| cli.repo_root.clone())
}

fn cmd_run(cli: &Cli, args: &RunArgs, mode: Mode) -> anyhow::Result<()> {
    let repo_root = resolve_repo_root(cli);

    let result = (|| -> anyhow::Result<i32> {
        if !repo_root.is_dir() {
            anyhow::bail!("repo root does not exist: {repo_root}");
        }
        let config = read_config(cli, &repo_root)?;

        let output = run_check(CheckInput {
            repo_root: &repo_root,
            config: config_source(&config),
            overrides: overrides(cli),
            mode,
        })?;

        print!("{}", format_diagnostics(&output.batch));

        if let Some(report_out) = &args.report_out {
            write_report(report_out, &output.report).context("write report json")?;
        }
        if let Some(markdown_out) = &args.markdown_out {
            let md = render_report_markdown(&output.report);
            write_text_file(markdown_out, &md).context("write markdown")?;
        }

        Ok(verdict_exit_code(output.report.verdict.status))
    })();

    let _ = std::io::stdout().flush();
    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            if let Some(report_out) = &args.report_out {
                let mode_name = match mode {
                    Mode::Update => "update",
                    Mode::Check => "check",
                };
                let report = runtime_error_report(mode_name, &format!("{err:#}"));
                let _ = write_report(report_out, &report);
            }
            eprintln!("pinguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {path}"))?;
    Ok(())
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let md = run_markdown(MarkdownInput { report_path })?;

    match output {
        Some(out_path) => write_text_file(out_path, &md).context("write markdown output")?,
        None => print!("{md}"),
    }

    Ok(())
}

fn cmd_annotations(report_path: &Utf8Path, max: usize) -> anyhow::Result<()> {
    for annotation in run_annotations(AnnotationsInput { report_path, max })? {
        println!("{annotation}");
    }
    Ok(())
}

fn cmd_explain(identifier: &str) -> anyhow::Result<()> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", pinguard_app::format_explanation(&exp));
            Ok(())
        }
        ExplainOutput::NotFound {
            identifier,
            available_check_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                pinguard_app::format_not_found(&identifier, available_check_ids, available_codes)
            );
            std::process::exit(1);
        }
    }
}

fn cmd_policy(cli: &Cli) -> anyhow::Result<()> {
    let repo_root = resolve_repo_root(cli);
    let config = read_config(cli, &repo_root)?;
    let text = run_policy(config_source(&config), overrides(cli))?;
    print!("{text}");
    Ok(())
}
