use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use validate_yaml::{
    Cli, Config, ConfigManager, ErrorReporter, FileDiscovery, FileValidationResult, GuardError,
    Output, SchemaLoader, ValidationEngine, VerbosityLevel,
};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let usage = GuardError::Usage(e.render().to_string());
                ErrorReporter::new(VerbosityLevel::Normal).report(&usage);
                return ExitCode::FAILURE;
            }
        },
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // Flags and the config file together decide the effective verbosity
    let config = match runtime.block_on(ConfigManager::load_config(&cli)) {
        Ok(config) => config,
        Err(e) => {
            ErrorReporter::new(cli.verbosity()).report(&GuardError::from(e));
            return ExitCode::FAILURE;
        }
    };
    let verbosity = config.output.verbosity();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "validate-yaml starting");

    match runtime.block_on(run(&cli, config)) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<GuardError>() {
                Some(error) => ErrorReporter::new(verbosity).report(error),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: Config) -> anyhow::Result<ExitCode> {
    tracing::info!(?config, "effective configuration");

    let output = Output::new(config.output.verbosity(), config.output.color);

    let schema = SchemaLoader::new(config.schema.strict)
        .load(&cli.schema)
        .await?;
    tracing::info!(schema = %schema.path().display(), "schema compiled");

    let file_discovery = FileDiscovery::from_config(&config.files);
    let engine = ValidationEngine::from_config(schema, &config.rules);
    tracing::debug!(checks = ?engine.active_checks(), "validation pipeline ready");

    if output.verbosity() != VerbosityLevel::Quiet {
        println!(
            "{}",
            output.format_scanning(&cli.folder, config.files.recursive)
        );
    }

    let files = file_discovery.discover_files(&cli.folder).await?;
    if files.is_empty() {
        println!("{}", output.format_discovered(0, &cli.folder));
        return Ok(ExitCode::SUCCESS);
    }
    if output.verbosity() != VerbosityLevel::Quiet {
        println!("{}", output.format_discovered(files.len(), &cli.folder));
    }

    let results = engine
        .validate_files(files, &mut |result: &FileValidationResult| {
            if output.should_show(result) {
                println!("{}", output.format_file_result(result));
            }
        })
        .await;

    println!("{}", output.format_summary(&results));

    Ok(results.exit_code())
}
