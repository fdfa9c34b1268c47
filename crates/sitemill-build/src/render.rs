//! Template rendering.
//!
//! The pipeline renders through the [`Renderer`] trait so the engine stays a
//! swappable collaborator; [`TeraRenderer`] is the shipped implementation.
//! Context is always passed explicitly per render call. The engine holds no
//! ambient state between calls.

use std::path::Path;

use serde_json::{Map, Value};
use tera::Tera;
use thiserror::Error;
use tracing::debug;

/// Render context: a JSON object handed to the engine as-is.
pub type Context = Map<String, Value>;

/// Result type alias using `RenderError`.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Template rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The template directory could not be loaded.
    #[error("Template load error: {0}")]
    Load(String),

    /// The engine failed to render a template.
    #[error("Render error for '{template}': {source}")]
    Render {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// Engine-agnostic render failure, for [`Renderer`] implementations not
    /// backed by Tera.
    #[error("Render error for '{template}': {message}")]
    Failed { template: String, message: String },
}

/// A template engine mapping template name plus context to rendered text.
pub trait Renderer: Send + Sync {
    /// Render the named template with the given context.
    fn render(&self, template: &str, context: &Context) -> Result<String>;
}

/// Tera-backed renderer loading every template under one directory.
///
/// Template names are paths relative to the directory, so `templates/404.html`
/// renders as `404.html` and `templates/partials/nav.html` as
/// `partials/nav.html`.
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Load all templates under `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let pattern = format!("{}/**/*", dir.display());
        let tera = Tera::new(&pattern).map_err(|err| RenderError::Load(err.to_string()))?;

        debug!(
            dir = %dir.display(),
            count = tera.get_template_names().count(),
            "loaded templates"
        );

        Ok(Self { tera })
    }

    /// Names of the loaded templates, for diagnostics.
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.tera.get_template_names()
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, template: &str, context: &Context) -> Result<String> {
        let context =
            tera::Context::from_serialize(context).map_err(|source| RenderError::Render {
                template: template.to_string(),
                source,
            })?;

        self.tera
            .render(template, &context)
            .map_err(|source| RenderError::Render {
                template: template.to_string(),
                source,
            })
    }
}
