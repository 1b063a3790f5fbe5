//! CLI binary for brd-kpi.
//!
//! A thin shim over the library crate: logs in, uploads one document,
//! applies the decisions given as flags and prints the resulting tables.

use anyhow::{Context, Result};
use brd_kpi::extract::read_document;
use brd_kpi::render::table_markdown;
use brd_kpi::{AnalysisConfig, CredentialStore, KpiId, PdfTextExtractor, ReviewSession, UploadOutcome};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract KPIs from a requirements document
  brd-kpi --user admin --password admin123 requirements.docx

  # Accept row 1, reject row 2, then build the final table
  brd-kpi -u admin -p admin123 --accept 1 --reject 2 --finalize brd.txt

  # Validate recommended rows in the final table
  brd-kpi -u admin -p admin123 --finalize --validate 3,4 brd.txt

  # PDF through a pdfium shared library (build with --features pdfium)
  brd-kpi -u admin -p admin123 --pdf-backend pdfium --pdfium-lib /opt/pdfium brd.pdf

  # Full session as JSON
  brd-kpi -u admin -p admin123 --finalize --json brd.docx > review.json

ROW IDS:
  Every row is printed with its ID. IDs stay the same from preview to the
  final table, so the numbers shown by a plain run can be passed straight
  to --accept / --reject / --validate / --reject-final.

ENVIRONMENT VARIABLES:
  BRD_KPI_USER          Login user name
  BRD_KPI_PASSWORD      Login password
  BRD_KPI_PDF_BACKEND   none, lopdf or pdfium
  BRD_KPI_OWNER         Owner/SME written on recommended rows
  PDFIUM_LIB_PATH       libpdfium file or directory (pdfium backend)
  RUST_LOG              Overrides the log filter
"#;

/// Extract KPIs from Business Requirements Documents and review them.
#[derive(Parser, Debug)]
#[command(
    name = "brd-kpi",
    version,
    about = "Extract KPIs from Business Requirements Documents (DOCX, PDF, TXT) and review them",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// BRD file (.docx, .pdf or .txt).
    input: PathBuf,

    /// Login user name.
    #[arg(short, long, env = "BRD_KPI_USER")]
    user: String,

    /// Login password.
    #[arg(short, long, env = "BRD_KPI_PASSWORD", hide_env_values = true)]
    password: String,

    /// PDF text engine.
    #[arg(long, env = "BRD_KPI_PDF_BACKEND", value_enum, default_value = "lopdf")]
    pdf_backend: PdfBackendArg,

    /// pdfium shared library, or the directory holding it (pdfium backend only).
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// Accept preview rows (comma-separated IDs).
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    accept: Vec<u64>,

    /// Reject preview rows (comma-separated IDs).
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    reject: Vec<u64>,

    /// Merge decisions and recommendations into the final table.
    #[arg(long)]
    finalize: bool,

    /// Validate final-table rows (comma-separated IDs).
    #[arg(long, value_delimiter = ',', value_name = "IDS", requires = "finalize")]
    validate: Vec<u64>,

    /// Reject final-table rows (comma-separated IDs).
    #[arg(long, value_delimiter = ',', value_name = "IDS", requires = "finalize")]
    reject_final: Vec<u64>,

    /// Owner/SME written on recommended rows.
    #[arg(long, env = "BRD_KPI_OWNER")]
    owner: Option<String>,

    /// Print the session as JSON instead of Markdown tables.
    #[arg(long, env = "BRD_KPI_JSON")]
    json: bool,

    /// Disable the extraction spinner.
    #[arg(long, env = "BRD_KPI_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BRD_KPI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the tables.
    #[arg(short, long, env = "BRD_KPI_QUIET")]
    quiet: bool,
}

impl Cli {
    fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress && !self.json
    }

    /// Log level when `RUST_LOG` is unset. INFO lines would tear through the
    /// spinner, so only warnings show while it runs.
    fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else if self.show_progress() {
            "warn"
        } else {
            "info"
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PdfBackendArg {
    None,
    Lopdf,
    Pdfium,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = cli.show_progress();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let mut session = CredentialStore::default()
        .login(&cli.user, &cli.password, config)
        .context("Login failed")?;

    // ── Upload ───────────────────────────────────────────────────────────
    let filename = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.input.display().to_string());

    let start = Instant::now();
    let spinner = show_progress.then(|| extraction_spinner(&filename));
    let outcome = read_document(&cli.input)
        .and_then(|bytes| session.upload(&filename, "", &bytes));
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    // Extraction failures are reported, not propagated: the message is
    // already meant for the user.
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} {}", red("✘"), e);
            return Ok(ExitCode::from(2));
        }
    };

    if !cli.quiet && !cli.json {
        let elapsed = dim(&format!("{}ms", start.elapsed().as_millis()));
        match outcome {
            UploadOutcome::Populated { kpis } => eprintln!(
                "{} {} KPIs extracted from {}  {}",
                green("✔"),
                bold(&kpis.to_string()),
                bold(&filename),
                elapsed
            ),
            UploadOutcome::NoKpisFound => eprintln!(
                "{} No KPIs found in {}. Try a different document.  {}",
                cyan("⚠"),
                bold(&filename),
                elapsed
            ),
        }
    }

    apply_decisions(&mut session, &cli)?;

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&session.snapshot())
            .context("Failed to serialise session")?;
        println!("{json}");
    } else {
        print_tables(&session);
        warn!(
            "Tables are read-only here; change rows with --accept, --reject, --finalize, \
             --validate and --reject-final"
        );
    }

    session.logout();
    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder();
    if let Some(extractor) = pdf_extractor(cli) {
        builder = builder.pdf_extractor(extractor);
    }
    if let Some(ref owner) = cli.owner {
        builder = builder.recommended_owner(owner.clone());
    }
    builder.build().context("Invalid configuration")
}

fn pdf_extractor(cli: &Cli) -> Option<Arc<dyn PdfTextExtractor>> {
    if cli.pdfium_lib.is_some() && cli.pdf_backend != PdfBackendArg::Pdfium {
        warn!("--pdfium-lib is ignored unless --pdf-backend pdfium is selected");
    }

    match cli.pdf_backend {
        PdfBackendArg::None => None,
        #[cfg(feature = "lopdf")]
        PdfBackendArg::Lopdf => Some(Arc::new(brd_kpi::LopdfTextExtractor)),
        #[cfg(feature = "pdfium")]
        PdfBackendArg::Pdfium => Some(Arc::new(match cli.pdfium_lib {
            Some(ref dir) => brd_kpi::PdfiumTextExtractor::new(Some(dir.clone())),
            None => brd_kpi::PdfiumTextExtractor::from_env(),
        })),
        #[allow(unreachable_patterns)]
        other => {
            warn!("PDF backend {:?} is not compiled into this build", other);
            None
        }
    }
}

/// Apply the decision flags in workflow order: preview, finalize, final table.
fn apply_decisions(session: &mut ReviewSession, cli: &Cli) -> Result<()> {
    for &id in &cli.accept {
        session
            .accept(KpiId::new(id))
            .with_context(|| format!("Cannot accept row {id}"))?;
    }
    for &id in &cli.reject {
        session
            .reject(KpiId::new(id))
            .with_context(|| format!("Cannot reject row {id}"))?;
    }

    if !cli.finalize {
        return Ok(());
    }
    session.finalize().context("Cannot finalize review")?;

    for &id in &cli.validate {
        session
            .validate(KpiId::new(id))
            .with_context(|| format!("Cannot validate row {id}"))?;
    }
    for &id in &cli.reject_final {
        session
            .reject_final(KpiId::new(id))
            .with_context(|| format!("Cannot reject final row {id}"))?;
    }
    Ok(())
}

fn print_tables(session: &ReviewSession) {
    let sections = [
        ("Extracted KPIs", session.preview()),
        ("Recommended KPIs", session.recommended()),
        ("Final KPI Table", session.final_table()),
    ];
    for (title, table) in sections {
        if let Some(table) = table {
            println!("## {title}\n");
            println!("{}", table_markdown(table));
        }
    }
}

fn extraction_spinner(filename: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Extracting");
    bar.set_message(filename.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lists_split_on_commas() {
        let cli = Cli::try_parse_from([
            "brd-kpi", "-u", "admin", "-p", "admin123", "--accept", "1,3", "--finalize",
            "--validate", "5", "brd.txt",
        ])
        .unwrap();
        assert_eq!(cli.accept, vec![1, 3]);
        assert_eq!(cli.validate, vec![5]);
        assert_eq!(cli.pdf_backend, PdfBackendArg::Lopdf);
    }

    #[test]
    fn log_filter_follows_flags() {
        let parse = |extra: &[&str]| {
            let mut args = vec!["brd-kpi", "-u", "admin", "-p", "admin123"];
            args.extend_from_slice(extra);
            args.push("brd.txt");
            Cli::try_parse_from(args).unwrap()
        };
        assert_eq!(parse(&[]).default_log_filter(), "warn");
        assert_eq!(parse(&["--no-progress"]).default_log_filter(), "info");
        assert_eq!(parse(&["--json"]).default_log_filter(), "info");
        assert_eq!(parse(&["-q"]).default_log_filter(), "error");
        assert_eq!(parse(&["-v", "-q"]).default_log_filter(), "debug");
    }

    #[test]
    fn final_actions_require_finalize() {
        let res = Cli::try_parse_from([
            "brd-kpi", "-u", "admin", "-p", "admin123", "--validate", "2", "brd.txt",
        ]);
        assert!(res.is_err());
    }
}
