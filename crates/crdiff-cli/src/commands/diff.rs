//! Diff command - show all changes between two sets of CRDs

use super::compare::{self, CompareArgs};
use crate::OutputFormat;
use crate::error::Result;

pub fn run(args: &CompareArgs, output: OutputFormat, color: bool) -> Result<()> {
    compare::run(args, false, output, color)
}
