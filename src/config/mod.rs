//! Hosting configuration
//!
//! Holds the ordered document-root templates and script-alias entries
//! consulted on every request. The configuration is built once at startup
//! (from TOML or from Apache-compatible directives, see [`directives`]),
//! then shared read-only across request handling; there is no mutation
//! after load and therefore no locking.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::template::{Template, TemplateSyntaxError};

pub mod directives;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid template '{map}' for {directive}: {source}")]
    Template {
        directive: &'static str,
        map: String,
        source: TemplateSyntaxError,
    },
    #[error("syntax error at line {line}: {message}")]
    Directive { line: usize, message: String },
}

/// One script-alias entry: a URI prefix and the templates tried for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptAlias {
    prefix: String,
    templates: Vec<Template>,
}

impl ScriptAlias {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}

/// Ordered template lists for mass virtual hosting.
///
/// Both lists are append-only while the configuration is being built and
/// immutable afterwards; order is an observable contract, since resolution
/// takes the first template whose expansion exists on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostingConfig {
    document_roots: Vec<Template>,
    script_aliases: Vec<ScriptAlias>,
}

impl HostingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a document-root template.
    pub fn add_document_root(&mut self, map: &str) -> Result<(), ConfigError> {
        let template = parse_template("VirtualDocumentRoots", map)?;
        self.document_roots.push(template);
        Ok(())
    }

    /// Validate and append a script-alias template under `prefix`.
    ///
    /// Prefixes are deduplicated: a template for an already-known prefix is
    /// appended to that entry's list, new prefixes append new entries in
    /// first-seen order.
    pub fn add_script_alias(&mut self, prefix: &str, map: &str) -> Result<(), ConfigError> {
        let template = parse_template("VirtualScriptAliases", map)?;
        match self
            .script_aliases
            .iter_mut()
            .find(|entry| entry.prefix == prefix)
        {
            Some(entry) => entry.templates.push(template),
            None => self.script_aliases.push(ScriptAlias {
                prefix: prefix.to_string(),
                templates: vec![template],
            }),
        }
        Ok(())
    }

    pub fn document_roots(&self) -> &[Template] {
        &self.document_roots
    }

    pub fn script_aliases(&self) -> &[ScriptAlias] {
        &self.script_aliases
    }

    pub fn is_empty(&self) -> bool {
        self.document_roots.is_empty() && self.script_aliases.is_empty()
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents)?;
        let mut config = Self::new();
        for map in &raw.document_roots {
            config.add_document_root(map)?;
        }
        for alias in &raw.script_aliases {
            for map in &alias.templates {
                config.add_script_alias(&alias.prefix, map)?;
            }
        }
        Ok(config)
    }
}

fn parse_template(directive: &'static str, map: &str) -> Result<Template, ConfigError> {
    Template::parse(map).map_err(|source| ConfigError::Template {
        directive,
        map: map.to_string(),
        source,
    })
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    document_roots: Vec<String>,

    #[serde(default)]
    script_aliases: Vec<RawScriptAlias>,
}

#[derive(Debug, Deserialize)]
struct RawScriptAlias {
    prefix: String,

    #[serde(default)]
    templates: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_roots_keep_insertion_order() {
        let mut config = HostingConfig::new();
        config.add_document_root("/var/www/%0/htdocs").unwrap();
        config.add_document_root("/srv/%-1/%0").unwrap();

        let maps: Vec<&str> = config.document_roots().iter().map(|t| t.as_str()).collect();
        assert_eq!(maps, ["/var/www/%0/htdocs", "/srv/%-1/%0"]);
    }

    #[test]
    fn script_alias_prefixes_are_deduplicated() {
        let mut config = HostingConfig::new();
        config.add_script_alias("cgi-bin", "/var/www/%0/cgi-bin").unwrap();
        config.add_script_alias("fcgi-bin", "/var/www/%0/fcgi-bin").unwrap();
        config.add_script_alias("cgi-bin", "/srv/cgi/%-1").unwrap();

        assert_eq!(config.script_aliases().len(), 2);
        let entry = &config.script_aliases()[0];
        assert_eq!(entry.prefix(), "cgi-bin");
        let maps: Vec<&str> = entry.templates().iter().map(|t| t.as_str()).collect();
        assert_eq!(maps, ["/var/www/%0/cgi-bin", "/srv/cgi/%-1"]);
    }

    #[test]
    fn invalid_template_rejects_the_directive() {
        let mut config = HostingConfig::new();
        let err = config.add_document_root("/var/www/%a").unwrap_err();
        assert!(matches!(err, ConfigError::Template { .. }));
        assert!(config.is_empty());
    }

    #[test]
    fn parses_toml_config() {
        let toml = r#"
            document_roots = ["/var/www/%0/htdocs"]

            [[script_aliases]]
            prefix = "cgi-bin"
            templates = ["/var/www/%0/cgi-bin", "/srv/cgi/%-1"]
        "#;

        let config = HostingConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.document_roots().len(), 1);
        assert_eq!(config.script_aliases().len(), 1);
        assert_eq!(config.script_aliases()[0].templates().len(), 2);
    }

    #[test]
    fn toml_with_bad_template_fails_to_load() {
        let toml = r#"document_roots = ["/var/www/%"]"#;
        assert!(HostingConfig::from_toml_str(toml).is_err());
    }
}
