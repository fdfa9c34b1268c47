//! Build orchestration.
//!
//! One build run is a fixed sequence: clean the output tree, acquire
//! content, resolve the target spec, execute every surviving target, and
//! report. Failures before execution abort the run; failures during
//! execution are collected per target and reported together.

use std::{collections::HashMap, path::PathBuf, time::Instant};

use futures::StreamExt;
use sitemill_content::ContentClient;
use sitemill_core::{Config, CoreError, DataMap, Target, TargetSpec};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    acquire::{self, AcquireError},
    execute::{self, ExecuteError},
    fsops,
    render::Renderer,
    resolve::{self, ResolveError},
};

/// Result type alias using `BuildError`.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Fatal build errors. These abort the run; per-target execution failures
/// land in the [`BuildReport`] instead.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The configuration could not produce a target spec.
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    /// Content acquisition failed.
    #[error("Acquisition error: {0}")]
    Acquire(#[from] AcquireError),

    /// Target resolution failed.
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// I/O outside any single target failed, i.e. the output cleanup.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One failed target, as reported to the user.
#[derive(Debug)]
pub struct TargetFailure {
    /// Human-readable target identity.
    pub target: String,
    /// The error that stopped it.
    pub error: ExecuteError,
}

/// Outcome of one build run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Number of targets executed successfully.
    pub written: usize,
    /// Number of duplicate-destination targets superseded by a later one.
    pub collisions: usize,
    /// Per-target failures; non-empty means the build failed.
    pub failures: Vec<TargetFailure>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
}

impl BuildReport {
    /// Whether every executed target succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build orchestrator. Owns the configuration and the two injected
/// collaborators for the duration of one run.
pub struct Builder {
    config: Config,
    client: Box<dyn ContentClient>,
    renderer: Box<dyn Renderer>,
    spec: Option<TargetSpec>,
}

impl Builder {
    /// Create a builder over a validated configuration and its
    /// collaborators.
    #[must_use]
    pub fn new(config: Config, client: Box<dyn ContentClient>, renderer: Box<dyn Renderer>) -> Self {
        Self {
            config,
            client,
            renderer,
            spec: None,
        }
    }

    /// Use a programmatic target spec instead of compiling one from the
    /// configuration's target rules.
    #[must_use]
    pub fn with_spec(mut self, spec: TargetSpec) -> Self {
        self.spec = Some(spec);
        self
    }

    /// Run one full build.
    pub async fn build(self) -> Result<BuildReport> {
        let start = Instant::now();
        let output_dir = PathBuf::from(&self.config.build.output_dir);

        info!(output_dir = %output_dir.display(), "starting build");

        // The target spec compiles before any I/O so a bad rule aborts
        // with the output tree still intact.
        let spec = match self.spec {
            Some(spec) => spec,
            None => self.config.target_spec()?,
        };

        fsops::remove_tree(&output_dir).await?;

        // Hard barrier: every fetch settles before resolution starts.
        let data = acquire::acquire(&self.config.sources, self.client.as_ref()).await?;

        let targets = resolve::resolve_with_depth(&spec, &data, self.config.build.max_depth)?;
        info!(count = targets.len(), "targets resolved");

        // Duplicate destinations collapse to the last writer up front, so
        // concurrent execution cannot race on the same file.
        let (targets, collisions) = dedup_last_writer(targets);

        let failures = run_targets(
            &targets,
            &data,
            self.renderer.as_ref(),
            self.config.build.concurrency,
        )
        .await;

        let report = BuildReport {
            written: targets.len() - failures.len(),
            collisions,
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            written = report.written,
            collisions = report.collisions,
            failed = report.failures.len(),
            duration_ms = report.duration_ms,
            "build finished"
        );

        Ok(report)
    }
}

/// Keep only the last target per destination, preserving order otherwise.
/// Returns the survivors and the number of targets dropped.
fn dedup_last_writer(targets: Vec<Target>) -> (Vec<Target>, usize) {
    let mut last_for_dest: HashMap<PathBuf, usize> = HashMap::new();
    for (index, target) in targets.iter().enumerate() {
        if let Some(previous) = last_for_dest.insert(target.dest().to_path_buf(), index) {
            warn!(
                dest = %target.dest().display(),
                superseded = %targets[previous].describe(),
                winner = %target.describe(),
                "destination collision, later target wins"
            );
        }
    }

    let dropped = targets.len() - last_for_dest.len();
    let survivors = targets
        .into_iter()
        .enumerate()
        .filter(|(index, target)| last_for_dest.get(target.dest()) == Some(index))
        .map(|(_, target)| target)
        .collect();

    (survivors, dropped)
}

/// Execute targets with at most `concurrency` in flight, collecting
/// per-target failures without aborting siblings.
async fn run_targets(
    targets: &[Target],
    data: &DataMap,
    renderer: &dyn Renderer,
    concurrency: usize,
) -> Vec<TargetFailure> {
    let concurrency = concurrency.max(1);

    let results: Vec<(&Target, execute::Result<()>)> =
        futures::stream::iter(targets.iter().map(|target| async move {
            (target, execute::execute(target, data, renderer).await)
        }))
        .buffered(concurrency)
        .collect()
        .await;

    let mut failures = Vec::new();
    for (target, result) in results {
        if let Err(error) = result {
            warn!(%error, "target failed: {}", target.describe());
            failures.push(TargetFailure {
                target: target.describe(),
                error,
            });
        }
    }
    failures
}
