//! Sitemill Build Library
//!
//! The build engine for the Sitemill pipeline:
//! - `acquire`: fetch every declared source concurrently into the per-run
//!   data map
//! - `resolve`: flatten the target spec, expanding generators depth-first
//!   with a recursion bound
//! - `render`: the renderer seam and the Tera implementation
//! - `execute`: copy/render I/O for one concrete target
//! - `build`: orchestration and the build report
//!
//! The phases run strictly in that order; content never changes mid-build.

pub mod acquire;
pub mod build;
pub mod execute;
pub mod fsops;
pub mod render;
pub mod resolve;

pub use acquire::{AcquireError, acquire};
pub use build::{BuildError, BuildReport, Builder, TargetFailure};
pub use execute::{ExecuteError, execute};
pub use render::{Context, RenderError, Renderer, TeraRenderer};
pub use resolve::{DEFAULT_MAX_DEPTH, ResolveError, resolve, resolve_with_depth};
