use anyhow::{Context, Result};
use hopscope_config::{config_path, ensure_workspace_config, validate_config};
use hopscoped::cli::{Cli, Commands, LogFormat, parse_cli};
use hopscoped::evaluate::run_evaluate_command;
use hopscoped::exists::run_exists_command;
use hopscoped::path::run_path_command;
use hopscoped::summary::run_summary_command;
use tracing::warn;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

fn main() -> Result<()> {
    let cli = parse_cli();
    init_tracing(cli.log_format);
    run(cli)
}

fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Human => {
            let subscriber = Registry::default()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        LogFormat::Json => {
            let subscriber = Registry::default().with(env_filter).with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            );
            tracing::subscriber::set_global_default(subscriber).ok();
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let workspace = cli.workspace.canonicalize().with_context(|| {
        format!(
            "failed to resolve workspace path {}",
            cli.workspace.display()
        )
    })?;

    let config = ensure_workspace_config(&workspace).with_context(|| {
        format!(
            "failed to load or create workspace config at {}",
            config_path(&workspace).display()
        )
    })?;
    for warning in validate_config(&config) {
        warn!(code = warning.code, "config warning: {}", warning.message);
    }

    let mut out = std::io::stdout();
    match cli.command {
        Commands::Path(args) => run_path_command(&workspace, &config, args, &mut out),
        Commands::Exists(args) => run_exists_command(&workspace, &config, args, &mut out),
        Commands::Summary(args) => run_summary_command(&workspace, &config, args, &mut out),
        Commands::Evaluate(args) => run_evaluate_command(&workspace, args, &mut out),
    }
}
