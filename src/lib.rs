//! VeloHost - Mass virtual hosting engine
//!
//! VeloHost resolves an incoming request's hostname into a tenant-specific
//! document root using ordered format-string templates, so one server
//! process can host unlimited virtual domains without per-domain
//! configuration:
//! - Hostname-pattern templates (`/var/www/%0/htdocs`, `/srv/%-1/%1`)
//! - Ordered, filesystem-probing resolution with script-alias support
//! - Ownership lookup on the resolved root for privilege separation
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use velohost::config::HostingConfig;
//! use velohost::resolve::{Resolution, VhostResolver};
//!
//! let mut config = HostingConfig::new();
//! config.add_document_root("/var/www/%0/htdocs").unwrap();
//!
//! let resolver = VhostResolver::new(Arc::new(config));
//! match resolver.resolve("/index.html", "www.example.com") {
//!     Resolution::Resolved(mapping) => println!("{}", mapping.filename.display()),
//!     Resolution::Declined => println!("no template resolved"),
//! }
//! ```

pub mod config;
#[cfg(unix)]
pub mod identity;
pub mod resolve;
pub mod template;

pub use config::HostingConfig;
pub use resolve::{Resolution, ResolvedMapping, VhostResolver};
pub use template::Template;

/// VeloHost version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Token registered into the host server's version banner at startup.
pub const VERSION_COMPONENT: &str = concat!("VeloHost/", env!("CARGO_PKG_VERSION"));
