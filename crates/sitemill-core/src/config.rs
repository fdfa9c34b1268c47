//! Build configuration.
//!
//! One TOML file declares everything a build needs: the remote collections
//! to fetch (`[[sources]]`), the outputs to produce (`[[targets]]`) and the
//! build/content settings. Loaded once at startup and validated before any
//! I/O happens; the declarative target rules compile into the runtime
//! [`TargetSpec`] consumed by the resolver.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    error::{CoreError, Result},
    model::{CopyTarget, RenderTarget, Source, Target, TargetGenerator, TargetNode, TargetSpec},
    pattern,
};

/// Main configuration for a site build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Build pipeline settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Content provider settings.
    #[serde(default)]
    pub content: ContentConfig,

    /// Declared remote collections, fetched once per build.
    #[serde(default)]
    pub sources: Vec<Source>,

    /// Declarative target rules, in output order.
    #[serde(default)]
    pub targets: Vec<TargetRule>,
}

/// Build pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory, removed and repopulated by every build.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory the template engine loads from.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// Bound on generator recursion during target resolution.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of targets executing at once (1 = sequential).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            templates_dir: default_templates_dir(),
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
        }
    }
}

/// Content provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Which client implementation serves the declared sources.
    #[serde(default)]
    pub provider: ContentProvider,

    /// Base URL of the content delivery API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Space identifier on the delivery API.
    #[serde(default)]
    pub space: Option<String>,

    /// Environment within the space.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Directory of local fixture files, used by the fixtures provider.
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            provider: ContentProvider::default(),
            api_url: default_api_url(),
            space: None,
            environment: default_environment(),
            fixtures_dir: default_fixtures_dir(),
        }
    }
}

/// Available content client implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentProvider {
    /// Remote content delivery API over HTTPS.
    #[default]
    Delivery,
    /// Local JSON fixture files.
    Fixtures,
}

/// One declarative target rule.
///
/// The rule shape is inferred from the fields present: `src`/`dest` copies a
/// tree, `template`/`dest` renders once, `each` fans out one render per entry
/// of a source. A table matching none of the shapes fails to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetRule {
    /// One render target per entry of the named source.
    Each(EachRule),
    /// Verbatim copy of a file or directory tree.
    Copy(CopyRule),
    /// Single template render.
    Render(RenderRule),
}

/// Copy rule: `src` and `dest` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyRule {
    /// File or directory to copy.
    pub src: PathBuf,
    /// Destination path.
    pub dest: PathBuf,
}

/// Render rule: one template, one output file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderRule {
    /// Template name.
    pub template: String,
    /// Output file path.
    pub dest: PathBuf,
    /// Sources exposed to the template context.
    #[serde(default)]
    pub include: IncludeSpec,
    /// Static values overlaid on the context.
    #[serde(default)]
    pub extra_context: Map<String, Value>,
}

/// Fan-out rule: one render target per entry of `each`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EachRule {
    /// Source whose entries drive the fan-out.
    pub each: String,
    /// Template name rendered for every entry.
    pub template: String,
    /// Destination pattern, interpolated per entry, e.g.
    /// `dist/{{ fields.url }}/index.html`.
    pub dest: String,
    /// Sources exposed to the template context.
    #[serde(default)]
    pub include: IncludeSpec,
    /// Static values overlaid on the context; the entry's own fields are
    /// overlaid on top of these.
    #[serde(default)]
    pub extra_context: Map<String, Value>,
}

/// Sources to expose to a render context: an explicit list, or `"*"` for
/// every declared source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncludeSpec {
    /// A wildcard string; only `"*"` is accepted.
    All(String),
    /// Explicit list of source names.
    Names(Vec<String>),
}

impl Default for IncludeSpec {
    fn default() -> Self {
        Self::Names(Vec::new())
    }
}

impl IncludeSpec {
    /// Expand to an explicit name list against the declared sources. The
    /// wildcard expands in declaration order; explicit names must all be
    /// declared.
    fn resolve(&self, sources: &[Source]) -> std::result::Result<Vec<String>, String> {
        match self {
            Self::All(token) if token == "*" => {
                Ok(sources.iter().map(|source| source.name.clone()).collect())
            }
            Self::All(other) => Err(format!(
                "invalid include '{other}': expected a list of source names or \"*\""
            )),
            Self::Names(names) => {
                for name in names {
                    if !sources.iter().any(|source| &source.name == name) {
                        return Err(format!("include references undeclared source '{name}'"));
                    }
                }
                Ok(names.clone())
            }
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|err| {
            CoreError::config_with_source(format!("failed to parse {}", path.display()), err)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides applied.
    ///
    /// Variables prefixed `SITEMILL` override file values, with `__`
    /// separating nesting levels, e.g. `SITEMILL_BUILD__OUTPUT_DIR=public`.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("SITEMILL").separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Point the build at a different output directory.
    ///
    /// Every target dest under the configured output directory is rebased
    /// onto the new one, `each` dest patterns included; the prefix match is
    /// by path component, so placeholder segments pass through untouched.
    /// Dests outside the output directory stay where they are and are
    /// re-flagged.
    pub fn retarget_output(&mut self, output_dir: impl Into<String>) {
        let old = PathBuf::from(&self.build.output_dir);
        self.build.output_dir = output_dir.into();
        let new = PathBuf::from(&self.build.output_dir);

        for rule in &mut self.targets {
            match rule {
                TargetRule::Copy(rule) => rebase_dest(&mut rule.dest, &old, &new),
                TargetRule::Render(rule) => rebase_dest(&mut rule.dest, &old, &new),
                TargetRule::Each(rule) => {
                    if let Some(dest) = rebased(Path::new(&rule.dest), &old, &new) {
                        rule.dest = dest.to_string_lossy().to_string();
                    }
                }
            }
        }

        for rule in &self.targets {
            self.warn_on_stray_dest(rule);
        }
    }

    /// Validate the configuration, rejecting anything the pipeline would
    /// trip over later: duplicate or empty source names, zero bounds,
    /// dangling include or `each` references, malformed wildcard strings.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.is_empty() {
                return Err(CoreError::config("source name cannot be empty"));
            }
            if source.content_type.is_empty() {
                return Err(CoreError::config(format!(
                    "source '{}' has an empty content_type",
                    source.name
                )));
            }
            if !seen.insert(source.name.as_str()) {
                return Err(CoreError::config(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
        }

        if self.build.max_depth == 0 {
            return Err(CoreError::config("build.max_depth must be at least 1"));
        }
        if self.build.concurrency == 0 {
            return Err(CoreError::config("build.concurrency must be at least 1"));
        }

        for (index, rule) in self.targets.iter().enumerate() {
            self.validate_rule(index, rule)?;
            self.warn_on_stray_dest(rule);
        }

        Ok(())
    }

    fn validate_rule(&self, index: usize, rule: &TargetRule) -> Result<()> {
        let include = match rule {
            TargetRule::Copy(_) => return Ok(()),
            TargetRule::Render(rule) => &rule.include,
            TargetRule::Each(rule) => {
                if !self.sources.iter().any(|source| source.name == rule.each) {
                    return Err(CoreError::config(format!(
                        "targets[{index}]: 'each' references undeclared source '{}'",
                        rule.each
                    )));
                }
                &rule.include
            }
        };

        include
            .resolve(&self.sources)
            .map_err(|message| CoreError::config(format!("targets[{index}]: {message}")))?;
        Ok(())
    }

    /// A dest outside the output directory survives the next clean; legal
    /// but usually a mistake, so flag it.
    fn warn_on_stray_dest(&self, rule: &TargetRule) {
        let dest = match rule {
            TargetRule::Copy(rule) => rule.dest.clone(),
            TargetRule::Render(rule) => rule.dest.clone(),
            TargetRule::Each(rule) => PathBuf::from(&rule.dest),
        };
        if !dest.starts_with(&self.build.output_dir) {
            warn!(
                dest = %dest.display(),
                output_dir = %self.build.output_dir,
                "target dest is outside the output directory"
            );
        }
    }

    /// Compile the declarative target rules into a runtime target spec.
    ///
    /// Copy and render rules are already concrete; `each` rules become
    /// labelled generators that expand once the data map is available.
    /// Wildcard includes are expanded here, so generators never re-read the
    /// source list.
    pub fn target_spec(&self) -> Result<TargetSpec> {
        let mut spec = TargetSpec::with_capacity(self.targets.len());
        for (index, rule) in self.targets.iter().enumerate() {
            spec.push(self.compile_rule(index, rule)?);
        }
        Ok(spec)
    }

    fn compile_rule(&self, index: usize, rule: &TargetRule) -> Result<TargetNode> {
        match rule {
            TargetRule::Copy(rule) => Ok(TargetNode::Concrete(Target::Copy(CopyTarget {
                src: rule.src.clone(),
                dest: rule.dest.clone(),
            }))),
            TargetRule::Render(rule) => {
                let include = rule
                    .include
                    .resolve(&self.sources)
                    .map_err(|message| CoreError::config(format!("targets[{index}]: {message}")))?;
                Ok(TargetNode::Concrete(Target::Render(RenderTarget {
                    template: rule.template.clone(),
                    dest: rule.dest.clone(),
                    include,
                    extra_context: rule.extra_context.clone(),
                })))
            }
            TargetRule::Each(rule) => {
                let include = rule
                    .include
                    .resolve(&self.sources)
                    .map_err(|message| CoreError::config(format!("targets[{index}]: {message}")))?;
                Ok(TargetNode::Generator(each_generator(rule.clone(), include)))
            }
        }
    }
}

/// Build the fan-out generator for an `each` rule.
///
/// Every entry of the driving source becomes one render target: the dest
/// pattern interpolates against the entry JSON, and the entry's fields
/// overlay the rule's static extra context.
fn each_generator(rule: EachRule, include: Vec<String>) -> TargetGenerator {
    let label = format!("each {}", rule.each);
    TargetGenerator::named(label, move |data| {
        let entries = data
            .get(&rule.each)
            .ok_or_else(|| format!("source '{}' is missing from the data map", rule.each))?;

        let mut nodes = Vec::with_capacity(entries.len());
        for entry in entries {
            let dest = pattern::interpolate(&rule.dest, &entry.to_value())?;

            let mut extra_context = rule.extra_context.clone();
            for (key, value) in &entry.fields {
                extra_context.insert(key.clone(), value.clone());
            }

            nodes.push(TargetNode::Concrete(Target::Render(RenderTarget {
                template: rule.template.clone(),
                dest: PathBuf::from(dest),
                include: include.clone(),
                extra_context,
            })));
        }

        Ok(TargetNode::List(nodes))
    })
}

/// `dest` moved from under `old` to under `new`, or `None` when `dest` is
/// not under `old`.
fn rebased(dest: &Path, old: &Path, new: &Path) -> Option<PathBuf> {
    let rest = dest.strip_prefix(old).ok()?;
    Some(if rest.as_os_str().is_empty() {
        new.to_path_buf()
    } else {
        new.join(rest)
    })
}

fn rebase_dest(dest: &mut PathBuf, old: &Path, new: &Path) {
    if let Some(moved) = rebased(dest, old, new) {
        *dest = moved;
    }
}

fn default_output_dir() -> String {
    "dist".to_string()
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_max_depth() -> usize {
    32
}

fn default_concurrency() -> usize {
    16
}

fn default_api_url() -> String {
    "https://cdn.contentful.com".to_string()
}

fn default_environment() -> String {
    "master".to_string()
}

fn default_fixtures_dir() -> String {
    "fixtures".to_string()
}
