mod builtin;
mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use tessera_core::{KernelConfig, Runtime};

/// Tessera: deploys component assemblies and drives their lifecycle
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Kernel settings file (JSON, YAML or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Place the deploy and work directories below this directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy unit directories and keep them running until Ctrl-C
    Run {
        /// Unpacked unit directories; each is deployed under its directory name
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Shut down right after deploying
        #[arg(long)]
        once: bool,
    },
    /// Install and verify a unit without activating it
    Verify {
        /// Unpacked unit directory
        source: PathBuf,
    },
    /// List the built-in component and listener types
    Types,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(level);
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn kernel_config(args: &CliArgs) -> Result<KernelConfig, String> {
    let mut config = match &args.config {
        Some(path) => KernelConfig::load(path).map_err(|e| e.to_string())?,
        None => KernelConfig::default(),
    };
    if let Some(root) = &args.root {
        let rooted = KernelConfig::rooted_at(root);
        config.deploy_dir = rooted.deploy_dir;
        config.work_dir = rooted.work_dir;
    }
    Ok(config)
}

fn unit_name(source: &Path) -> Result<String, String> {
    source
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("Cannot derive a unit name from '{}'", source.display()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    let Some(command) = &args.command else {
        println!("No command specified. Run with --help to see the available commands.");
        return ExitCode::SUCCESS;
    };

    let catalog = match builtin::catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Failed to register built-in component types: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Commands::Types = command {
        cli::print_types(&catalog);
        return ExitCode::SUCCESS;
    }

    let config = match kernel_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load kernel settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let runtime = Runtime::new(config, catalog);

    let code = match command {
        Commands::Run { sources, once } => run(&runtime, sources, *once).await,
        Commands::Verify { source } => verify(&runtime, source).await,
        Commands::Types => ExitCode::SUCCESS,
    };

    println!("Shutting down...");
    if let Err(e) = runtime.shutdown().await {
        error!("Shutdown finished with errors: {}", e);
        return ExitCode::FAILURE;
    }
    code
}

async fn run(runtime: &Runtime, sources: &[PathBuf], once: bool) -> ExitCode {
    let mut failures = 0;
    for source in sources {
        let name = match unit_name(source) {
            Ok(name) => name,
            Err(e) => {
                eprintln!("{}", e);
                failures += 1;
                continue;
            }
        };

        match runtime.deployer().deploy(&name, source).await {
            Ok(report) => {
                println!("Deployed unit '{}'", name);
                for warning in &report.warnings {
                    warn!("Unit '{}': {}", name, warning);
                }
            }
            Err(e) => {
                eprintln!("Failed to deploy '{}': {}", name, e);
                failures += 1;
            }
        }
    }

    cli::print_units(runtime.kernel()).await;

    if !once && !runtime.kernel().list_unit_names().is_empty() {
        println!("Running. Press Ctrl-C to stop.");
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received"),
            Err(e) => error!("Unable to listen for Ctrl-C: {}", e),
        }
    }

    if failures > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

async fn verify(runtime: &Runtime, source: &Path) -> ExitCode {
    let name = match unit_name(source) {
        Ok(name) => name,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.deployer().inspect(&name, source).await {
        Ok(assembly) => {
            cli::print_assembly(&assembly);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Verification of '{}' failed: {}", name, e);
            ExitCode::FAILURE
        }
    }
}
