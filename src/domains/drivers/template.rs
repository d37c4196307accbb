//! Resource templates.
//!
//! Directory and SQL drivers fetch a flat map of backend attributes and hand
//! it to a per-deployment template, which shapes it into a YAML resource
//! document. Templates use Handlebars syntax:
//!
//! ```text
//! aliases:
//!   - "mailto:{{mail}}"
//! links:
//!   - rel: "http://webfinger.net/rel/profile-page"
//!     href: "https://www.example.com/~{{uid}}/"
//! ```
//!
//! Rendering is strict: referencing an attribute that is not in the map is
//! an error rather than an empty string.

use handlebars::Handlebars;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Flat attribute map handed to templates.
pub type AttributeMap = HashMap<String, String>;

const TEMPLATE_NAME: &str = "resource";

/// Errors that can occur while loading or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("cannot read template '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template source is not valid.
    #[error("invalid template: {0}")]
    Syntax(#[source] Box<handlebars::TemplateError>),

    /// Rendering failed, e.g. an attribute was missing.
    #[error("template rendering failed: {0}")]
    Render(#[source] Box<handlebars::RenderError>),
}

/// Something that turns an attribute map into a YAML resource document.
pub trait Render: Send + Sync {
    /// Render the document for the given attributes.
    fn render(&self, attributes: &AttributeMap) -> Result<Vec<u8>, TemplateError>;
}

impl<F> Render for F
where
    F: Fn(&AttributeMap) -> Result<Vec<u8>, TemplateError> + Send + Sync,
{
    fn render(&self, attributes: &AttributeMap) -> Result<Vec<u8>, TemplateError> {
        self(attributes)
    }
}

/// Handlebars-backed template, compiled once and reused for every lookup.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Load and compile a template file.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_source(&source)
    }

    /// Compile a template from source text.
    pub fn from_source(source: &str) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| TemplateError::Syntax(Box::new(e)))?;

        Ok(Self { registry })
    }
}

impl Render for TemplateRenderer {
    fn render(&self, attributes: &AttributeMap) -> Result<Vec<u8>, TemplateError> {
        self.registry
            .render(TEMPLATE_NAME, attributes)
            .map(String::into_bytes)
            .map_err(|e| TemplateError::Render(Box::new(e)))
    }
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn attributes(pairs: &[(&str, &str)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_attributes() {
        let renderer = TemplateRenderer::from_source("aliases:\n  - \"mailto:{{mail}}\"\n").unwrap();
        let out = renderer
            .render(&attributes(&[("mail", "bob@foobar.com")]))
            .unwrap();

        assert_eq!(out, b"aliases:\n  - \"mailto:bob@foobar.com\"\n");
    }

    #[test]
    fn test_render_does_not_html_escape() {
        let renderer = TemplateRenderer::from_source("{{cn}} <{{mail}}>").unwrap();
        let out = renderer
            .render(&attributes(&[("cn", "Bob & Alice"), ("mail", "ba@x.org")]))
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Bob & Alice <ba@x.org>");
    }

    #[test]
    fn test_render_bracketed_attribute_names() {
        let renderer = TemplateRenderer::from_source("{{[given-name]}}").unwrap();
        let out = renderer.render(&attributes(&[("given-name", "Bob")])).unwrap();

        assert_eq!(out, b"Bob");
    }

    #[test]
    fn test_render_missing_attribute_is_error() {
        let renderer = TemplateRenderer::from_source("{{uid}}").unwrap();
        let result = renderer.render(&attributes(&[("mail", "bob@foobar.com")]));

        assert!(matches!(result, Err(TemplateError::Render(_))));
    }

    #[test]
    fn test_empty_attribute_renders_empty() {
        let renderer = TemplateRenderer::from_source("name: '{{cn}}'").unwrap();
        let out = renderer.render(&attributes(&[("cn", "")])).unwrap();

        assert_eq!(out, b"name: ''");
    }

    #[test]
    fn test_syntax_error_is_rejected() {
        let result = TemplateRenderer::from_source("{{#if mail}}unterminated");
        assert!(matches!(result, Err(TemplateError::Syntax(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resource.hbs");
        fs::write(&path, "subject: {{uid}}").unwrap();

        let renderer = TemplateRenderer::from_file(&path).unwrap();
        let out = renderer.render(&attributes(&[("uid", "bob")])).unwrap();

        assert_eq!(out, b"subject: bob");
    }

    #[test]
    fn test_from_missing_file() {
        let result = TemplateRenderer::from_file(Path::new("/nonexistent/template.hbs"));
        assert!(matches!(result, Err(TemplateError::Read { .. })));
    }

    #[test]
    fn test_closure_renderer() {
        let stub = |attrs: &AttributeMap| -> Result<Vec<u8>, TemplateError> {
            Ok(format!("aliases: [\"{}\"]", attrs["uid"]).into_bytes())
        };

        let out = stub.render(&attributes(&[("uid", "bob")])).unwrap();
        assert_eq!(out, b"aliases: [\"bob\"]");
    }
}
