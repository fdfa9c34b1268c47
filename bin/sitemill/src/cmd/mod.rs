//! Command implementations for the Sitemill CLI.

pub mod build;
pub mod check;
pub mod serve;
