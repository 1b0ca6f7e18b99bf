//! Shared comparison flow of the diff and breaking commands

use std::path::PathBuf;

use clap::Args;
use crdiff_core::{LoadOptions, load_crds};
use crdiff_engine::{CompareOptions, Report, TextRenderOptions, compare_all, render_text};

use crate::OutputFormat;
use crate::error::{CliError, Result};

/// Arguments common to all comparing commands
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Base CRD file or directory
    pub base: PathBuf,

    /// Revision CRD file or directory
    pub revision: PathBuf,

    /// Only compare these versions (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub versions: Vec<String>,

    /// Ignore changes to field descriptions
    #[arg(long)]
    pub ignore_descriptions: bool,

    /// Keep unchanged CRDs in the report
    #[arg(long)]
    pub include_unchanged: bool,

    /// Report CRDs that only exist in the revision
    #[arg(long = "include-added")]
    pub include_added: bool,
}

impl CompareArgs {
    fn options(&self, breaking_only: bool) -> CompareOptions {
        CompareOptions {
            versions: self.versions.clone(),
            breaking_only,
            ignore_descriptions: self.ignore_descriptions,
            include_unchanged: self.include_unchanged,
            include_added_crds: self.include_added,
        }
    }
}

/// Load both snapshots, compare them and print the report
pub fn run(args: &CompareArgs, breaking_only: bool, output: OutputFormat, color: bool) -> Result<()> {
    let load_options = LoadOptions::default();

    tracing::debug!(source = %args.base.display(), "Loading base CRDs");
    let base = load_crds(&args.base, &load_options).map_err(|e| CliError::load("base", e))?;

    tracing::debug!(source = %args.revision.display(), "Loading revision CRDs");
    let revision =
        load_crds(&args.revision, &load_options).map_err(|e| CliError::load("revision", e))?;

    tracing::debug!(base = base.len(), revision = revision.len(), "Comparing CRDs");
    let report = compare_all(&base, &revision, &args.options(breaking_only))?;

    let changed = if breaking_only {
        report.has_breaking_changes()
    } else {
        report.has_changes()
    };
    if !changed {
        tracing::info!("No changes detected.");
    }

    print_report(&report, breaking_only, output, color)
}

fn print_report(report: &Report, breaking_only: bool, output: OutputFormat, color: bool) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => {
            let text = render_text(report, &TextRenderOptions { color, breaking_only });
            if !text.is_empty() {
                println!("{text}");
            }
        }
    }

    Ok(())
}
