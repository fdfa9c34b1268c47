//! Target resolution.
//!
//! Flattens a target spec into the ordered list of concrete targets,
//! expanding generators depth-first. Declaration order is preserved exactly:
//! whatever a node expands to occupies that node's position in the output.
//! Resolution is pure; all content was fetched beforehand and no I/O happens
//! here.

use sitemill_core::{DataMap, GeneratorError, Target, TargetNode, TargetSpec};
use thiserror::Error;
use tracing::trace;

/// Default bound on generator recursion.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Result type alias using `ResolveError`.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Target resolution errors.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Generator expansion exceeded the configured depth bound. Almost
    /// always a generator that returns itself.
    #[error("Target resolution exceeded max generator depth {max_depth}")]
    MaxDepthExceeded { max_depth: usize },

    /// A generator invocation returned an error.
    #[error("Generator '{label}' (position {position}) failed: {source}")]
    Generator {
        position: usize,
        label: String,
        #[source]
        source: GeneratorError,
    },
}

/// Resolve a spec with the default depth bound.
pub fn resolve(spec: &TargetSpec, data: &DataMap) -> Result<Vec<Target>> {
    resolve_with_depth(spec, data, DEFAULT_MAX_DEPTH)
}

/// Resolve a spec, allowing at most `max_depth` nested generator
/// expansions along any one chain.
pub fn resolve_with_depth(
    spec: &TargetSpec,
    data: &DataMap,
    max_depth: usize,
) -> Result<Vec<Target>> {
    let mut targets = Vec::new();
    for (position, node) in spec.iter().enumerate() {
        resolve_node(node, data, position, 0, max_depth, &mut targets)?;
    }
    Ok(targets)
}

/// Flatten one node into `targets`. `depth` counts generator invocations on
/// the current chain; lists nest for free.
fn resolve_node(
    node: &TargetNode,
    data: &DataMap,
    position: usize,
    depth: usize,
    max_depth: usize,
    targets: &mut Vec<Target>,
) -> Result<()> {
    match node {
        TargetNode::Concrete(target) => {
            targets.push(target.clone());
            Ok(())
        }
        TargetNode::List(nodes) => {
            for (position, node) in nodes.iter().enumerate() {
                resolve_node(node, data, position, depth, max_depth, targets)?;
            }
            Ok(())
        }
        TargetNode::Generator(generator) => {
            if depth >= max_depth {
                return Err(ResolveError::MaxDepthExceeded { max_depth });
            }

            trace!(
                position,
                depth,
                label = generator.label().unwrap_or_default(),
                "expanding generator"
            );

            let produced = generator
                .produce(data)
                .map_err(|source| ResolveError::Generator {
                    position,
                    label: generator.label().unwrap_or("unnamed").to_string(),
                    source,
                })?;

            resolve_node(&produced, data, position, depth + 1, max_depth, targets)
        }
    }
}
