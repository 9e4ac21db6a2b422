//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use council_application::{
    CouncilConfig, GenerateTitleUseCase, NoProgress, ProgressNotifier, RunCouncilError,
    RunCouncilUseCase,
};
use council_domain::{Model, OutputFormat as Format, Question, Severity};
use council_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, OpenRouterGateway,
};
use council_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when Stage 3 failed but Stages 1 and 2 were printed
const EXIT_SYNTHESIS_FAILED: u8 = 2;
/// Conventional status for SIGINT
const EXIT_CANCELLED: u8 = 130;

/// Install the subscriber. The returned guard flushes the log file on drop.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "llm-council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn parse_models(names: &[String], flag: &str) -> Result<Vec<Model>> {
    names
        .iter()
        .map(|name| Model::new(name.as_str()).with_context(|| format!("invalid {flag} value")))
        .collect()
}

/// Merge CLI flags over the file configuration. Flags win field by field.
fn build_council_config(cli: &Cli, file: &FileConfig) -> Result<CouncilConfig> {
    let models = if cli.model.is_empty() {
        file.council
            .parse_models()
            .0
            .unwrap_or_else(Model::default_council)
    } else {
        parse_models(&cli.model, "--model")?
    };

    let chairman = match &cli.chairman {
        Some(name) => Model::new(name.as_str()).context("invalid --chairman value")?,
        None => file
            .council
            .parse_chairman()
            .0
            .unwrap_or_else(Model::default_chairman),
    };

    let raters = if cli.rater.is_empty() {
        file.council.parse_raters().0
    } else {
        Some(parse_models(&cli.rater, "--rater")?)
    };

    let mut config = CouncilConfig::new(models, chairman)?
        .with_params(file.execution.to_execution_params());
    if let Some(raters) = raters {
        config = config.with_raters(raters)?;
    }
    Ok(config)
}

/// Print validation issues; fail if any is an error.
fn check_config(file: &FileConfig) -> Result<()> {
    let issues = file.validate();
    let mut errors = 0;
    for issue in &issues {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => {
                errors += 1;
                eprintln!("config error: {}", issue.message);
            }
        }
    }
    if errors > 0 {
        bail!("configuration has {} error(s)", errors);
    }
    Ok(())
}

fn print_header(question: &Question, config: &CouncilConfig) {
    let council: Vec<&str> = config.council().iter().map(Model::as_str).collect();
    println!();
    println!("+============================================================+");
    println!("|                    LLM Council                             |");
    println!("+============================================================+");
    println!();
    println!("Question: {}", question.content());
    println!("Council:  {}", council.join(", "));
    println!("Chairman: {}", config.synthesis_model());
    println!();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = init_tracing(cli.verbose, cli.log_dir.as_deref());

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };
    check_config(&file_config)?;
    ConsoleFormatter::set_color(file_config.output.color && std::io::stdout().is_terminal());

    let Some(text) = cli.question.clone() else {
        bail!("a question is required");
    };
    let question = Question::new(text).context("the question cannot be empty")?;
    let council_config = build_council_config(&cli, &file_config)?;
    let format = cli
        .output
        .map(Format::from)
        .or(file_config.output.format)
        .unwrap_or_default();

    info!("Starting llm-council");

    // === Dependency Injection ===
    let gateway = Arc::new(OpenRouterGateway::from_config(&file_config.gateway)?);

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling deliberation");
            on_interrupt.cancel();
        }
    });

    let title_timeout = council_config.params().title_timeout;
    if !cli.quiet && format != Format::Json {
        print_header(&question, &council_config);
    }

    let mut use_case = RunCouncilUseCase::new(Arc::clone(&gateway), council_config)
        .with_cancellation(cancellation);
    if let Some(path) = &file_config.logging.conversation_log {
        match JsonlConversationLogger::open(path) {
            Ok(logger) => {
                info!("Writing transcript to {}", logger.path().display());
                use_case = use_case.with_conversation_logger(Arc::new(logger));
            }
            Err(e) => warn!("Could not open transcript {}: {}", path.display(), e),
        }
    }

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let title_model = file_config
        .council
        .parse_title_model()
        .0
        .unwrap_or_else(Model::default_title_model);
    let title_use_case =
        GenerateTitleUseCase::new(Arc::clone(&gateway), title_model).with_timeout(title_timeout);
    let title_question = question.clone();
    let title = async {
        if cli.title {
            Some(title_use_case.execute(&title_question).await)
        } else {
            None
        }
    };

    let (outcome, title) = tokio::join!(
        use_case.execute_with_progress(question, progress.as_ref()),
        title
    );

    let result = match outcome {
        Ok(result) => result,
        Err(RunCouncilError::Cancelled) => {
            eprintln!("Deliberation cancelled.");
            return Ok(ExitCode::from(EXIT_CANCELLED));
        }
        Err(e) => return Err(e.into()),
    };

    let output = match format {
        Format::Json => ConsoleFormatter::format_json(&result, title.as_deref()),
        Format::Full | Format::Synthesis => {
            let body = if format == Format::Full {
                ConsoleFormatter::format(&result)
            } else {
                ConsoleFormatter::format_synthesis_only(&result)
            };
            match &title {
                Some(title) => format!("{}\n{}", ConsoleFormatter::format_title(title), body),
                None => body,
            }
        }
    };
    println!("{}", output);

    if result.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_SYNTHESIS_FAILED))
    }
}
