mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use qsp_ai::{analysis_response_schema, AnalysisGateway, AnalysisSession, LLMProviderFactory};
use qsp_core::{render_plain_text, ConfigManager, Locale, LoggingConfig, ViewState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Input submitted by the demo action.
const DEMO_INPUT: &str = "تحليل سورة العصر";

#[derive(Parser)]
#[command(name = "qsp")]
#[command(about = "QSP - Quranic Symbolic Prognostics analysis engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Explicit config file (defaults to ./.qsp.toml, then ~/.qsp/config.toml)
    #[arg(long, global = true, env = "QSP_CONFIG")]
    config: Option<PathBuf>,

    /// Message language (ar, en); overrides the configured locale
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a verse, surah or civilizational phenomenon
    Analyze {
        /// Text to analyze
        #[arg(required_unless_present = "demo")]
        text: Vec<String>,

        /// Run the demo analysis of Surat al-Asr
        #[arg(long, conflicts_with = "text")]
        demo: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Interactive session (:retry, :home, :copy, :json, :status, :quit)
    Session,

    /// Print the JSON schema the provider must answer with
    Schema,

    /// Write a default config file
    InitConfig {
        /// Destination (defaults to ./.qsp.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&analysis_response_schema())?
            );
            return Ok(());
        }
        Commands::InitConfig { path, force } => return init_config(path.clone(), *force),
        _ => {}
    }

    let manager = load_config(cli.config.as_deref(), cli.verbose, std::io::stderr)?;
    let config = manager.config();

    init_tracing(&config.logging, cli.verbose);

    let locale = cli.locale.unwrap_or(config.ui.locale);
    let provider = LLMProviderFactory::create_from_config(&config.llm)
        .context("Failed to initialize analysis provider")?;
    info!(
        provider = provider.provider_name(),
        model = provider.model_name(),
        %locale,
        "QSP ready"
    );
    let gateway = Arc::new(AnalysisGateway::from_llm_config(provider, &config.llm));
    let session = AnalysisSession::new(gateway, locale);

    match cli.command {
        Commands::Analyze { text, demo, output } => {
            let ok = run_analyze(&session, &analysis_input(&text, demo), output).await?;
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Session => run_session(&session).await,
        Commands::Schema | Commands::InitConfig { .. } => Ok(()),
    }
}

/// Filter used while configuration is loading, before the configured level
/// is known.
fn bootstrap_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// Load configuration under a provisional subscriber so the load summary and
/// the missing-key warning reach `writer`.
fn load_config<W>(path: Option<&Path>, verbose: bool, writer: W) -> Result<ConfigManager>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let provisional = tracing_subscriber::fmt()
        .with_env_filter(bootstrap_filter(verbose))
        .with_writer(writer)
        .compact()
        .finish();

    tracing::subscriber::with_default(provisional, || match path {
        Some(path) => ConfigManager::load_from(path),
        None => ConfigManager::load(),
    })
    .context("Failed to load configuration")
}

fn analysis_input(text: &[String], demo: bool) -> String {
    if demo {
        DEMO_INPUT.to_string()
    } else {
        text.join(" ")
    }
}

/// Logs go to stderr; stdout carries only reports.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    if logging.format == "compact" {
        builder.compact().try_init().ok();
    } else {
        builder.pretty().try_init().ok();
    }
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(".qsp.toml"));
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    ConfigManager::create_default_config(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} {}", "Wrote".green().bold(), path.display());
    Ok(())
}

/// Returns `false` when the analysis ended in the error state.
async fn run_analyze(session: &AnalysisSession, text: &str, output: OutputFormat) -> Result<bool> {
    let Some(handle) = session.submit(text) else {
        bail!("Nothing to analyze: input is blank");
    };
    wait(handle, session.locale()).await?;
    show_state(&session.snapshot(), session.locale(), output)
}

async fn run_session(session: &AnalysisSession) -> Result<()> {
    let locale = session.locale();
    println!(
        "{}",
        "QSP session. Type text to analyze, or :retry :home :copy :json :status :quit".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            ":quit" | ":q" => break,
            ":home" => {
                session.reset();
                println!("{}", "IDLE".dimmed());
            }
            ":status" => println!("{}", render::describe(&session.snapshot())),
            ":retry" => match session.retry() {
                Some(handle) => {
                    wait(handle, locale).await?;
                    show_state(&session.snapshot(), locale, OutputFormat::Pretty)?;
                }
                None => println!("{}", "Nothing to retry".yellow()),
            },
            ":copy" => print_current(session, OutputFormat::Text)?,
            ":json" => print_current(session, OutputFormat::Json)?,
            text => {
                session.input_changed(text);
                if let Some(handle) = session.submit(text) {
                    wait(handle, locale).await?;
                    show_state(&session.snapshot(), locale, OutputFormat::Pretty)?;
                }
            }
        }
    }

    Ok(())
}

async fn wait(handle: JoinHandle<()>, locale: Locale) -> Result<()> {
    eprintln!("{}", locale.loading_message().dimmed());
    handle.await.context("Analysis task failed")
}

fn print_current(session: &AnalysisSession, output: OutputFormat) -> Result<()> {
    let state = session.snapshot();
    if state.result().is_none() {
        println!("{}", "No result to show".yellow());
        return Ok(());
    }
    show_state(&state, session.locale(), output)?;
    Ok(())
}

fn show_state(state: &ViewState, locale: Locale, output: OutputFormat) -> Result<bool> {
    match state {
        ViewState::Success(result) => {
            match output {
                OutputFormat::Pretty => render::print_pretty(result, locale),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
                OutputFormat::Text => println!("{}", render_plain_text(result, locale)),
            }
            Ok(true)
        }
        ViewState::Error { message, .. } => {
            render::print_error(message, locale);
            Ok(false)
        }
        ViewState::Idle | ViewState::Loading { .. } => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn config_load_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gemini-2.5-pro\"\n").unwrap();

        let capture = Capture::default();
        let manager = load_config(Some(&path), true, capture.clone()).unwrap();
        assert_eq!(manager.config().llm.model, "gemini-2.5-pro");

        let logs = capture.contents();
        assert!(logs.contains("Configuration loaded"), "{logs}");
        assert!(logs.contains("model: gemini-2.5-pro"), "{logs}");
    }

    #[test]
    fn demo_flag_submits_the_demo_input() {
        let cli = Cli::try_parse_from(["qsp", "analyze", "--demo"]).unwrap();
        let Commands::Analyze { text, demo, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(analysis_input(&text, demo), "تحليل سورة العصر");
    }

    #[test]
    fn analyze_needs_text_or_demo() {
        assert!(Cli::try_parse_from(["qsp", "analyze"]).is_err());
        assert!(Cli::try_parse_from(["qsp", "analyze", "--demo", "x"]).is_err());

        let cli = Cli::try_parse_from(["qsp", "analyze", "سورة", "الرعد", "-o", "json"]).unwrap();
        let Commands::Analyze { text, demo, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(analysis_input(&text, demo), "سورة الرعد");
    }
}
