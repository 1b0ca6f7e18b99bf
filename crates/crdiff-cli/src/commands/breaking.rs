//! Breaking command - show only the changes that break existing objects
//!
//! Added versions, added properties and added CRDs are never reported.

use super::compare::{self, CompareArgs};
use crate::OutputFormat;
use crate::error::Result;

pub fn run(args: &CompareArgs, output: OutputFormat, color: bool) -> Result<()> {
    compare::run(args, true, output, color)
}
