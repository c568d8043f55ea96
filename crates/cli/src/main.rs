mod report_cmd;

use clap::Parser;
use runlog_core::config::CONFIG_ENV;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "runlog",
    version,
    about = "Turn an agent run log (.jsonl) into an interactive HTML report"
)]
struct Cli {
    /// Path to the .jsonl run log
    input: Option<PathBuf>,

    /// Directory for the report (defaults to the input's directory)
    output_dir: Option<PathBuf>,

    /// Report settings file (runlog.toml)
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(input) = cli.input else {
        eprintln!("Usage: runlog <jsonl_path> [output_dir]");
        std::process::exit(1);
    };

    if let Err(e) = report_cmd::check_input(&input) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    if let Err(e) = report_cmd::run_report(&input, cli.output_dir.as_deref(), cli.config.as_deref())
    {
        eprintln!("Error generating report: {:#}", e);
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
