//! Terminal output for the hrun binary

use anyhow::Result;
use hrun_api::{LaunchSpec, Version};
use hrun_core::Reporter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Reports to the terminal: info on stdout, errors on stderr
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("hrun: {}", message);
    }
}

#[derive(Serialize)]
struct EnvDump<'a> {
    version: &'a str,
    install_path: &'a Path,
    program: &'a str,
    argv: &'a [String],
    env: &'a BTreeMap<String, String>,
}

/// Print the launch plan for `version` instead of running it
pub fn dump_env(version: &Version, launch: &LaunchSpec, json: bool) -> Result<()> {
    let dump = EnvDump {
        version: version.display(),
        install_path: version.install_path(),
        program: launch.program(),
        argv: launch.argv(),
        env: launch.env(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    println!("# {} {} ({})", dump.program, dump.version, dump.install_path.display());
    for (key, value) in dump.env {
        println!("{}={}", key, value);
    }
    println!("# argv: {}", dump.argv.join(" "));
    Ok(())
}
