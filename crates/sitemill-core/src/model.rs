//! Data model for the build pipeline.
//!
//! The model splits in two halves. Content types ([`Source`], [`Entry`],
//! [`DataMap`]) describe what acquisition fetches; target types ([`Target`],
//! [`TargetGenerator`], [`TargetNode`]) describe what the build writes.
//! A [`TargetSpec`] is the declared, ordered plan; resolution flattens it
//! into concrete targets once the data map exists.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A declared remote content collection.
///
/// `name` is the key under which the fetched entries are exposed to targets;
/// `content_type` is what the content client is asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Unique name of the collection within a configuration.
    pub name: String,
    /// Content type identifier passed to the content client.
    pub content_type: String,
}

impl Source {
    /// Create a new source declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
        }
    }
}

/// One fetched content record.
///
/// The wire shape belongs to the content client; the pipeline relies only on
/// the identifier and the `fields` mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable identifier assigned by the content service.
    pub id: String,
    /// Content type this entry belongs to.
    pub content_type: String,
    /// Field name to field value, as delivered.
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Creation timestamp, when the service reports one.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp, when the service reports one.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create an entry with the given id and content type and no fields.
    #[must_use]
    pub fn new(id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_type: content_type.into(),
            fields: Map::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Add a field value, consuming and returning self.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field value by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The entry as a JSON value, the shape destination patterns and
    /// templates see: `{ id, content_type, fields, created_at?, updated_at? }`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        object.insert(
            "content_type".to_string(),
            Value::String(self.content_type.clone()),
        );
        object.insert("fields".to_string(), Value::Object(self.fields.clone()));
        if let Some(created) = self.created_at {
            object.insert("created_at".to_string(), Value::String(created.to_rfc3339()));
        }
        if let Some(updated) = self.updated_at {
            object.insert("updated_at".to_string(), Value::String(updated.to_rfc3339()));
        }
        Value::Object(object)
    }
}

/// Immutable snapshot of fetched content for one build run.
///
/// Maps source name to the entries fetched for it, in API order. Built once
/// by acquisition; everything downstream only reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMap {
    collections: HashMap<String, Vec<Entry>>,
}

impl DataMap {
    /// Create an empty data map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(source name, entries)` pairs.
    #[must_use]
    pub fn from_entries(pairs: impl IntoIterator<Item = (String, Vec<Entry>)>) -> Self {
        Self {
            collections: pairs.into_iter().collect(),
        }
    }

    /// Entries fetched for a source, if the source was declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Entry]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    /// Whether a source name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Names of the sources in the snapshot, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Number of sources in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether the snapshot holds no sources at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Copy a file or directory tree verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    /// Source path, relative to the working directory.
    pub src: PathBuf,
    /// Destination path.
    pub dest: PathBuf,
}

impl CopyTarget {
    /// Create a new copy target.
    #[must_use]
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }
}

/// Render a template to a single output file.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    /// Template name, resolved by the renderer.
    pub template: String,
    /// Output file path.
    pub dest: PathBuf,
    /// Source names whose entries enter the render context.
    pub include: Vec<String>,
    /// Extra context merged over the included data on key collision.
    pub extra_context: Map<String, Value>,
}

impl RenderTarget {
    /// Create a render target with an empty context.
    #[must_use]
    pub fn new(template: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            dest: dest.into(),
            include: Vec::new(),
            extra_context: Map::new(),
        }
    }

    /// Set the included source names, consuming and returning self.
    #[must_use]
    pub fn with_include(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add one extra context value, consuming and returning self.
    #[must_use]
    pub fn with_context_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_context.insert(key.into(), value.into());
        self
    }
}

/// A concrete build output instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Copy a static file or tree.
    Copy(CopyTarget),
    /// Render a template to a file.
    Render(RenderTarget),
}

impl Target {
    /// Destination path this target writes to.
    #[must_use]
    pub fn dest(&self) -> &Path {
        match self {
            Self::Copy(target) => &target.dest,
            Self::Render(target) => &target.dest,
        }
    }

    /// Short human-readable identity for logs and reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Copy(target) => format!(
                "copy {} -> {}",
                target.src.display(),
                target.dest.display()
            ),
            Self::Render(target) => {
                format!("render {} -> {}", target.template, target.dest.display())
            }
        }
    }
}

/// Error type returned by generator closures.
pub type GeneratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

type GeneratorFn = dyn Fn(&DataMap) -> Result<TargetNode, GeneratorError> + Send + Sync;

/// A data-driven target factory.
///
/// Generators let a plan say "one page per fetched entry" without seeing the
/// data up front: resolution invokes them against the data map and splices
/// whatever they produce, which may itself contain further generators.
pub struct TargetGenerator {
    label: Option<String>,
    produce: Box<GeneratorFn>,
}

impl TargetGenerator {
    /// Wrap a closure as an unlabelled generator.
    pub fn new<F>(produce: F) -> Self
    where
        F: Fn(&DataMap) -> Result<TargetNode, GeneratorError> + Send + Sync + 'static,
    {
        Self {
            label: None,
            produce: Box::new(produce),
        }
    }

    /// Wrap a closure with a label used in logs and errors.
    pub fn named<F>(label: impl Into<String>, produce: F) -> Self
    where
        F: Fn(&DataMap) -> Result<TargetNode, GeneratorError> + Send + Sync + 'static,
    {
        Self {
            label: Some(label.into()),
            produce: Box::new(produce),
        }
    }

    /// Label, if one was set.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Invoke the generator against the data snapshot.
    pub fn produce(&self, data: &DataMap) -> Result<TargetNode, GeneratorError> {
        (self.produce)(data)
    }
}

impl fmt::Debug for TargetGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetGenerator")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// One element of a target specification, before resolution.
#[derive(Debug)]
pub enum TargetNode {
    /// A concrete leaf target, passed through as-is.
    Concrete(Target),
    /// A target factory, expanded during resolution.
    Generator(TargetGenerator),
    /// An ordered mix of the other shapes, spliced in place.
    List(Vec<TargetNode>),
}

impl From<Target> for TargetNode {
    fn from(target: Target) -> Self {
        Self::Concrete(target)
    }
}

impl From<CopyTarget> for TargetNode {
    fn from(target: CopyTarget) -> Self {
        Self::Concrete(Target::Copy(target))
    }
}

impl From<RenderTarget> for TargetNode {
    fn from(target: RenderTarget) -> Self {
        Self::Concrete(Target::Render(target))
    }
}

impl From<TargetGenerator> for TargetNode {
    fn from(generator: TargetGenerator) -> Self {
        Self::Generator(generator)
    }
}

/// Ordered target specification, as declared. Order here is the order
/// outputs materialize in.
pub type TargetSpec = Vec<TargetNode>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entry_field_lookup() {
        let entry = Entry::new("1", "page")
            .with_field("title", "Home")
            .with_field("order", 2);
        assert_eq!(entry.field("title"), Some(&json!("Home")));
        assert_eq!(entry.field("order"), Some(&json!(2)));
        assert_eq!(entry.field("missing"), None);
    }

    #[test]
    fn test_entry_to_value_shape() {
        let entry = Entry::new("abc", "page").with_field("url", "about");
        let value = entry.to_value();
        assert_eq!(value["id"], json!("abc"));
        assert_eq!(value["content_type"], json!("page"));
        assert_eq!(value["fields"]["url"], json!("about"));
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_entry_deserializes_with_defaults() {
        let entry: Entry = serde_json::from_value(json!({
            "id": "x",
            "content_type": "page",
        }))
        .unwrap();
        assert!(entry.fields.is_empty());
        assert!(entry.created_at.is_none());
    }

    #[test]
    fn test_data_map_lookup() {
        let data = DataMap::from_entries([
            ("pages".to_string(), vec![Entry::new("1", "page")]),
            ("posts".to_string(), Vec::new()),
        ]);
        assert_eq!(data.len(), 2);
        assert!(data.contains("pages"));
        assert!(!data.contains("authors"));
        assert_eq!(data.get("pages").map(<[Entry]>::len), Some(1));
        assert_eq!(data.get("posts").map(<[Entry]>::len), Some(0));
        assert!(data.get("authors").is_none());
    }

    #[test]
    fn test_target_dest_and_describe() {
        let copy = Target::Copy(CopyTarget::new("static", "dist"));
        assert_eq!(copy.dest(), Path::new("dist"));
        assert_eq!(copy.describe(), "copy static -> dist");

        let render = Target::Render(RenderTarget::new("404.html", "dist/404.html"));
        assert_eq!(render.dest(), Path::new("dist/404.html"));
        assert_eq!(render.describe(), "render 404.html -> dist/404.html");
    }

    #[test]
    fn test_render_target_builders() {
        let target = RenderTarget::new("page.html", "dist/index.html")
            .with_include(["pages", "posts"])
            .with_context_value("title", "Home");
        assert_eq!(target.include, vec!["pages", "posts"]);
        assert_eq!(target.extra_context["title"], json!("Home"));
    }

    #[test]
    fn test_generator_label_and_produce() {
        let generator = TargetGenerator::named("each pages", |_| {
            Ok(TargetNode::List(Vec::new()))
        });
        assert_eq!(generator.label(), Some("each pages"));
        let node = generator.produce(&DataMap::new()).unwrap();
        assert!(matches!(node, TargetNode::List(nodes) if nodes.is_empty()));
    }

    #[test]
    fn test_generator_debug_does_not_panic() {
        let generator = TargetGenerator::new(|_| Ok(TargetNode::List(Vec::new())));
        let debugged = format!("{generator:?}");
        assert!(debugged.contains("TargetGenerator"));
    }

    #[test]
    fn test_node_conversions() {
        let node: TargetNode = CopyTarget::new("a", "b").into();
        assert!(matches!(node, TargetNode::Concrete(Target::Copy(_))));

        let node: TargetNode = RenderTarget::new("t.html", "out.html").into();
        assert!(matches!(node, TargetNode::Concrete(Target::Render(_))));

        let node: TargetNode = TargetGenerator::new(|_| Ok(TargetNode::List(Vec::new()))).into();
        assert!(matches!(node, TargetNode::Generator(_)));
    }
}
