//! Version command

use serde::Serialize;

use crate::OutputFormat;
use crate::error::{CliError, Result};

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

const INFO: VersionInfo = VersionInfo {
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
};

pub fn run(output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Text => println!("{} {}", INFO.name, INFO.version),
        OutputFormat::Json => {
            let json = serde_json::to_string(&INFO).map_err(|e| CliError::Output {
                message: e.to_string(),
            })?;
            println!("{json}");
        }
    }

    Ok(())
}
