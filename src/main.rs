mod cli;

use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use torkit::make::{self, MakeError};
use torkit::progress::Style;

use cli::{Cli, Commands, MakeArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Make(args) => make_tool(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

fn make_tool(args: MakeArgs) -> ExitCode {
    init_logging(args.verbose);

    if args.announce_groups().is_empty() {
        eprintln!("You must specify at least one announce URL group");
        return ExitCode::FAILURE;
    }
    if args.inputs.is_empty() {
        eprintln!("You must specify at least one input file");
        return ExitCode::FAILURE;
    }

    let workers = args.worker_count();
    let style = Style::detect(args.no_colors);
    let builder = args.builder(args.collect_files());

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(workers + 1)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(workers, "started runtime");

    let open_sink = |batch: &torkit::Batch| {
        let path = args.output_path(batch.default_name());
        File::create(&path).map_err(|source| MakeError::Output { path, source })
    };

    let result = runtime.block_on(make::run(builder, open_sink, workers, style.clone()));
    cli::report_outcome(result, &style, &mut std::io::stderr())
}
