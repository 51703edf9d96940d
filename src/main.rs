use clap::Parser;
use miette::{IntoDiagnostic, Result};
use mdrc::cli::{Cli, Commands};
use mdrc::output::Printer;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).into_diagnostic()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let printer = Printer::new();

    match cli.command {
        Commands::Build(args) => mdrc::cli::build::run(args, &printer)?,
        Commands::Transform(args) => mdrc::cli::transform::run(args, &printer)?,
        Commands::Check(args) => mdrc::cli::check::run(args, &printer)?,
        Commands::Init(args) => mdrc::cli::init::run(args, &printer)?,
        Commands::Completions(args) => mdrc::cli::completions::run(args)?,
    }

    Ok(())
}
