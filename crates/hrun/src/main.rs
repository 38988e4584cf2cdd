//! hrun - launch a versioned application build and supervise it
//!
//! Wires together:
//! - Configuration loading and the build directory inventory
//! - Version resolution and launch environment construction
//! - The Linux process host with process group signal forwarding

mod console;

use anyhow::{Context, Result};
use clap::Parser;
use hrun_config::{DirectoryInventory, load_config, load_config_or_default};
use hrun_core::{EnvironmentBuilder, LaunchRequest, Reporter, Supervisor};
use hrun_host_linux::LinuxHost;
use hrun_util::{EXIT_CONFIG, config_path_without_env, to_process_code};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use console::{ConsoleReporter, dump_env};

/// hrun - run a program from an installed build
#[derive(Parser, Debug)]
#[command(name = "hrun")]
#[command(about = "Launch a versioned application build and supervise it", long_about = None)]
struct Args {
    /// Version to run: "latest", "default", or a partial version such as 18.0
    #[arg(short = 'V', long = "ver", default_value = "default")]
    ver: String,

    /// List installed versions instead of launching
    #[arg(short, long)]
    list: bool,

    /// Program to launch from the selected build
    #[arg(short, long, default_value = "houdini")]
    program: String,

    /// Start the real binary through the dynamic linker with the stub allocator
    #[arg(long)]
    no_jemalloc: bool,

    /// Install the version given by --ver
    #[arg(long, conflicts_with = "uninstall")]
    install: bool,

    /// Uninstall the version --ver resolves to
    #[arg(long)]
    uninstall: bool,

    /// Print the launch environment instead of launching
    #[arg(long)]
    dump_env: bool,

    /// Print the environment dump as JSON
    #[arg(long, requires = "dump_env")]
    json: bool,

    /// Point the builds root symlink at the version --ver resolves to
    #[arg(long)]
    create_symlink: bool,

    /// Configuration file (default: ~/.config/hrun/config.toml)
    #[arg(long, env = "HRUN_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Arguments passed through to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn run(args: &Args) -> Result<i32> {
    let settings = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => {
            let path = config_path_without_env();
            load_config_or_default(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
    };

    let builder = EnvironmentBuilder::from_process_env(settings.launch.clone());
    let inventory = DirectoryInventory::new(settings.inventory);
    let host = LinuxHost::new();
    let reporter = ConsoleReporter;
    let supervisor = Supervisor::new(&inventory, &host, &reporter, builder);

    if args.install {
        return Ok(supervisor.install(&args.ver));
    }
    if args.uninstall {
        return Ok(supervisor.uninstall(&args.ver));
    }
    if args.create_symlink {
        return Ok(supervisor.link(&args.ver));
    }

    if args.dump_env {
        return match supervisor.plan(&args.ver, &args.program, &args.args, args.no_jemalloc) {
            Ok((version, launch)) => {
                dump_env(&version, &launch, args.json)?;
                Ok(0)
            }
            Err(e) => {
                reporter.error(&e.to_string());
                Ok(e.exit_code())
            }
        };
    }

    let request = LaunchRequest {
        specifier: (!args.list).then(|| args.ver.clone()),
        program: args.program.clone(),
        args: args.args.clone(),
        bypass_allocator: args.no_jemalloc,
    };

    Ok(supervisor.run(&request))
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "hrun starting");

    match run(&args) {
        Ok(code) => ExitCode::from(to_process_code(code)),
        Err(e) => {
            error!(error = %e, "hrun failed to start");
            eprintln!("hrun: {:#}", e);
            ExitCode::from(to_process_code(EXIT_CONFIG))
        }
    }
}
