//! Apache-compatible directive loader
//!
//! Parses the two mass-hosting directives from an httpd.conf-style file:
//!
//! ```text
//! VirtualDocumentRoots /var/www/%0/htdocs /srv/%-1/%0
//! VirtualScriptAliases cgi-bin /var/www/%0/cgi-bin
//! ```
//!
//! `VirtualDocumentRoots` takes one or more templates; `VirtualScriptAliases`
//! takes a prefix followed by one or more templates. A template that fails
//! validation aborts the whole load, so a server never starts with a
//! malformed template in place. Other directives that may share the file are
//! skipped (or rejected in strict mode).

use std::fs;
use std::path::Path;

use tracing::warn;

use super::{ConfigError, HostingConfig};

/// Parser for Apache-style hosting directives.
pub struct DirectiveParser {
    /// Fail on directives this loader does not understand.
    strict: bool,
}

impl DirectiveParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Enable/disable strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse configuration from a file.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<HostingConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        self.parse(&content)
    }

    /// Parse configuration from string content.
    pub fn parse(&self, content: &str) -> Result<HostingConfig, ConfigError> {
        let mut config = HostingConfig::new();

        for (idx, line) in content.lines().enumerate() {
            let line_number = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut parts = trimmed.split_whitespace();
            let name = match parts.next() {
                Some(name) => name,
                None => continue,
            };

            if name.eq_ignore_ascii_case("VirtualDocumentRoots") {
                let maps: Vec<&str> = parts.collect();
                if maps.is_empty() {
                    return Err(ConfigError::Directive {
                        line: line_number,
                        message: "VirtualDocumentRoots expects at least one template".to_string(),
                    });
                }
                for map in maps {
                    config
                        .add_document_root(map)
                        .map_err(|err| located(line_number, err))?;
                }
            } else if name.eq_ignore_ascii_case("VirtualScriptAliases") {
                let prefix = parts.next().ok_or_else(|| ConfigError::Directive {
                    line: line_number,
                    message: "VirtualScriptAliases expects a prefix and a template".to_string(),
                })?;
                let maps: Vec<&str> = parts.collect();
                if maps.is_empty() {
                    return Err(ConfigError::Directive {
                        line: line_number,
                        message: "VirtualScriptAliases expects at least one template".to_string(),
                    });
                }
                for map in maps {
                    config
                        .add_script_alias(prefix, map)
                        .map_err(|err| located(line_number, err))?;
                }
            } else if self.strict {
                return Err(ConfigError::Directive {
                    line: line_number,
                    message: format!("unknown directive: {name}"),
                });
            } else {
                warn!(line = line_number, directive = name, "ignoring unknown directive");
            }
        }

        Ok(config)
    }
}

impl Default for DirectiveParser {
    fn default() -> Self {
        Self::new()
    }
}

fn located(line: usize, err: ConfigError) -> ConfigError {
    match err {
        err @ ConfigError::Template { .. } => ConfigError::Directive {
            line,
            message: err.to_string(),
        },
        other => other,
    }
}
