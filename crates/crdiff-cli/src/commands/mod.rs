//! CLI commands

pub mod breaking;
pub mod compare;
pub mod diff;
pub mod version;
