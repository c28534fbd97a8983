//! Request resolution engine
//!
//! Turns one request's (URI, hostname) pair into a concrete filesystem
//! mapping by walking the configured script-alias and document-root
//! templates in order and probing the filesystem for the first expansion
//! that exists. Runs synchronously inside the request path over the shared
//! read-only [`HostingConfig`]; nothing is cached between requests.

pub mod chain;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::HostingConfig;
use crate::template::Template;

/// Handler label forced onto requests resolved through a script alias.
pub const CGI_HANDLER: &str = "cgi-script";

/// Existence check for candidate paths.
///
/// A trait seam so tests can fake the filesystem; production uses
/// [`StatProbe`].
pub trait FilesystemProbe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatProbe;

impl FilesystemProbe for StatProbe {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
}

/// The per-request result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMapping {
    /// Concrete file path the request maps to.
    pub filename: PathBuf,

    /// Forced content handler, set when a script alias matched.
    pub handler: Option<String>,

    /// Document root recorded for later ownership lookup.
    pub virtual_root: PathBuf,
}

/// Outcome of one resolution attempt.
///
/// `Declined` is the normal miss path: the caller falls through to the
/// next resolver in its chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedMapping),
    Declined,
}

impl Resolution {
    pub fn is_declined(&self) -> bool {
        matches!(self, Resolution::Declined)
    }

    pub fn into_mapping(self) -> Option<ResolvedMapping> {
        match self {
            Resolution::Resolved(mapping) => Some(mapping),
            Resolution::Declined => None,
        }
    }
}

/// Mass virtual hosting resolver.
pub struct VhostResolver {
    config: Arc<HostingConfig>,
    probe: Arc<dyn FilesystemProbe>,
}

impl VhostResolver {
    /// Create a resolver probing the real filesystem.
    pub fn new(config: Arc<HostingConfig>) -> Self {
        Self::with_probe(config, Arc::new(StatProbe))
    }

    /// Create a resolver with a custom filesystem probe.
    pub fn with_probe(config: Arc<HostingConfig>, probe: Arc<dyn FilesystemProbe>) -> Self {
        Self { config, probe }
    }

    /// Resolve a request.
    ///
    /// Phase one scans the script aliases in configured order and selects
    /// the first entry whose prefix matches the URI; no later entry is
    /// consulted even when none of the selected entry's templates resolve.
    /// Phase two scans the document roots regardless; the first existing
    /// root claims the filename only when the alias phase left it unset,
    /// but it always becomes the virtual root used for ownership lookup.
    pub fn resolve(&self, uri: &str, hostname: &str) -> Resolution {
        let mut mapping: Option<ResolvedMapping> = None;

        if let Some(alias) = self
            .config
            .script_aliases()
            .iter()
            .find(|entry| prefix_matches(uri, entry.prefix()))
        {
            if let Some(root) = self.first_existing(hostname, alias.templates()) {
                let remainder = alias_remainder(uri, alias.prefix());
                mapping = Some(ResolvedMapping {
                    filename: PathBuf::from(format!("{root}{remainder}")),
                    handler: Some(CGI_HANDLER.to_string()),
                    virtual_root: PathBuf::from(root),
                });
            }
        }

        if let Some(root) = self.first_existing(hostname, self.config.document_roots()) {
            match &mut mapping {
                Some(found) => found.virtual_root = PathBuf::from(root),
                None => {
                    mapping = Some(ResolvedMapping {
                        filename: PathBuf::from(format!("{root}{uri}")),
                        handler: None,
                        virtual_root: PathBuf::from(root),
                    });
                }
            }
        }

        match mapping {
            Some(mapping) => {
                debug!(
                    filename = %mapping.filename.display(),
                    virtual_root = %mapping.virtual_root.display(),
                    handler = mapping.handler.as_deref(),
                    "request resolved"
                );
                Resolution::Resolved(mapping)
            }
            None => {
                trace!(uri, hostname, "no template resolved, declining");
                Resolution::Declined
            }
        }
    }

    /// Interpolate each template in order and return the first expansion
    /// the probe confirms. An oversized expansion skips that template.
    fn first_existing(&self, hostname: &str, templates: &[Template]) -> Option<String> {
        for template in templates {
            let candidate = match template.interpolate(hostname) {
                Ok(candidate) => candidate,
                Err(err) => {
                    debug!(template = template.as_str(), %err, "skipping template");
                    continue;
                }
            };
            if self.probe.exists(Path::new(&candidate)) {
                return Some(candidate);
            }
            trace!(candidate = %candidate, "probe miss");
        }
        None
    }
}

/// Raw prefix test at URI offsets 0 and 1, tolerating a missing leading
/// slash. Deliberately not segment-aware: prefix `app` also matches
/// `/application/x`, matching the long-standing directive behavior.
fn prefix_matches(uri: &str, prefix: &str) -> bool {
    uri.starts_with(prefix) || uri.get(1..).is_some_and(|rest| rest.starts_with(prefix))
}

/// The part of the URI appended to a matched script-alias root: everything
/// from the `/` at or before the end of the prefix match.
fn alias_remainder<'a>(uri: &'a str, prefix: &str) -> &'a str {
    let Some(pos) = uri.find(prefix) else {
        return uri;
    };
    let after = pos + prefix.len();
    if uri[after..].starts_with('/') {
        return &uri[after..];
    }
    match uri[..after].rfind('/') {
        Some(cut) => &uri[cut..],
        None => &uri[after..],
    }
}
