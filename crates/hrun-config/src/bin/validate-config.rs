//! Config validation CLI tool
//!
//! Validates an hrun configuration file and lists the builds it finds.

use hrun_api::BuildInventory;
use hrun_config::{ConfigError, DirectoryInventory, CURRENT_CONFIG_VERSION};
use hrun_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates an hrun configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match hrun_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            match &settings.inventory.builds_root {
                Some(root) => println!("  Builds root: {}", root.display()),
                None => println!("  Builds root: (none)"),
            }
            println!(
                "  Default version: {}",
                settings.inventory.default_version.as_deref().unwrap_or("(none)")
            );

            let inventory = DirectoryInventory::new(settings.inventory);
            match inventory.versions() {
                Ok(versions) if !versions.is_empty() => {
                    println!();
                    println!("Builds:");
                    for version in &versions {
                        let marker = if version.is_default() { " (default)" } else { "" };
                        println!(
                            "  - {}{}: {}",
                            version,
                            marker,
                            version.install_path().display()
                        );
                    }
                }
                Ok(_) => println!("  Builds: none found"),
                Err(e) => eprintln!("  Could not list builds: {}", e),
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
