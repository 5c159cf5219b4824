//! CLI command implementations

pub mod clean;
pub mod excerpt;
pub mod init;
pub mod list;
pub mod run;
