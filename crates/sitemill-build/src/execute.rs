//! Target execution.
//!
//! Performs the I/O for one concrete target: copy the tree, or assemble the
//! render context, render and write. Failures are scoped to the target so
//! the orchestrator can collect them without aborting siblings.

use std::path::PathBuf;

use serde_json::Value;
use sitemill_core::{DataMap, Entry, RenderTarget, Target};
use thiserror::Error;
use tracing::debug;

use crate::{
    fsops,
    render::{Context, RenderError, Renderer},
};

/// Result type alias using `ExecuteError`.
pub type Result<T> = std::result::Result<T, ExecuteError>;

/// Target execution errors.
#[derive(Error, Debug)]
pub enum ExecuteError {
    /// Copying a static file or tree failed.
    #[error("Copy {src} -> {dest} failed: {source}")]
    Copy {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A render target includes a source that is not in the data map.
    #[error("Render {template} -> {dest}: include key '{name}' is not in the data map")]
    UnknownInclude {
        template: String,
        dest: PathBuf,
        name: String,
    },

    /// Rendering failed.
    #[error("Render {template} -> {dest} failed: {source}")]
    Render {
        template: String,
        dest: PathBuf,
        #[source]
        source: RenderError,
    },

    /// Writing the rendered output failed.
    #[error("Write {dest} failed: {source}")]
    Write {
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Execute one concrete target against the data snapshot.
pub async fn execute(target: &Target, data: &DataMap, renderer: &dyn Renderer) -> Result<()> {
    match target {
        Target::Copy(copy) => {
            fsops::copy_tree(&copy.src, &copy.dest)
                .await
                .map_err(|source| ExecuteError::Copy {
                    src: copy.src.clone(),
                    dest: copy.dest.clone(),
                    source,
                })
        }
        Target::Render(render) => execute_render(render, data, renderer).await,
    }
}

async fn execute_render(
    target: &RenderTarget,
    data: &DataMap,
    renderer: &dyn Renderer,
) -> Result<()> {
    let context = build_context(target, data)?;

    let text = renderer
        .render(&target.template, &context)
        .map_err(|source| ExecuteError::Render {
            template: target.template.clone(),
            dest: target.dest.clone(),
            source,
        })?;

    fsops::write_file(&target.dest, text.as_bytes())
        .await
        .map_err(|source| ExecuteError::Write {
            dest: target.dest.clone(),
            source,
        })?;

    debug!(template = %target.template, dest = %target.dest.display(), "rendered");
    Ok(())
}

/// Assemble the render context: one key per included source holding its
/// entry array, then the extra context overlaid. On a key collision the
/// extra context wins.
fn build_context(target: &RenderTarget, data: &DataMap) -> Result<Context> {
    let mut context = Context::new();

    for name in &target.include {
        let entries = data.get(name).ok_or_else(|| ExecuteError::UnknownInclude {
            template: target.template.clone(),
            dest: target.dest.clone(),
            name: name.clone(),
        })?;
        let values: Vec<Value> = entries.iter().map(Entry::to_value).collect();
        context.insert(name.clone(), Value::Array(values));
    }

    for (key, value) in &target.extra_context {
        context.insert(key.clone(), value.clone());
    }

    Ok(context)
}
