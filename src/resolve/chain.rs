//! Name-translation resolver chain
//!
//! Stand-in for the host server's translate-name hook. Resolvers declare
//! an explicit [`HookOrder`] when registering instead of naming the
//! modules they must run after; within one order, registration order is
//! preserved. The chain also collects the version tokens modules register
//! at startup for the server banner.

use tracing::{debug, trace};

use super::{Resolution, VhostResolver};

/// Position of a resolver within the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HookOrder {
    First,
    Middle,
    Last,
}

impl HookOrder {
    fn rank(self) -> u8 {
        match self {
            HookOrder::First => 0,
            HookOrder::Middle => 1,
            HookOrder::Last => 2,
        }
    }
}

/// A participant in name translation. Returning
/// [`Resolution::Declined`] passes the request to the next resolver.
pub trait TranslateName: Send + Sync {
    fn name(&self) -> &'static str;

    fn translate(&self, uri: &str, hostname: &str) -> Resolution;
}

/// Ordered chain of name-translation resolvers.
#[derive(Default)]
pub struct TranslateChain {
    resolvers: Vec<(HookOrder, Box<dyn TranslateName>)>,
    version_components: Vec<String>,
}

impl TranslateChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver at an explicit position. Resolvers sharing a
    /// position run in registration order.
    pub fn register(&mut self, order: HookOrder, resolver: Box<dyn TranslateName>) {
        let at = self
            .resolvers
            .partition_point(|(existing, _)| existing.rank() <= order.rank());
        self.resolvers.insert(at, (order, resolver));
    }

    /// Record a module's version token for the server banner.
    pub fn add_version_component(&mut self, token: impl Into<String>) {
        self.version_components.push(token.into());
    }

    /// The server banner assembled from registered version tokens.
    pub fn server_banner(&self) -> String {
        self.version_components.join(" ")
    }

    /// Registered resolver names in execution order.
    pub fn resolver_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|(_, r)| r.name()).collect()
    }

    /// Run the chain: the first resolver that does not decline wins.
    pub fn translate(&self, uri: &str, hostname: &str) -> Resolution {
        for (_, resolver) in &self.resolvers {
            match resolver.translate(uri, hostname) {
                Resolution::Declined => {
                    trace!(resolver = resolver.name(), "declined");
                }
                resolved => {
                    debug!(resolver = resolver.name(), "translated");
                    return resolved;
                }
            }
        }
        Resolution::Declined
    }
}

impl TranslateName for VhostResolver {
    fn name(&self) -> &'static str {
        "mass-hosting"
    }

    fn translate(&self, uri: &str, hostname: &str) -> Resolution {
        self.resolve(uri, hostname)
    }
}

impl VhostResolver {
    /// Install this resolver into a chain at the middle position, after
    /// alias-style resolvers, and register the module's version token.
    pub fn register(self, chain: &mut TranslateChain) {
        chain.add_version_component(crate::VERSION_COMPONENT);
        chain.register(HookOrder::Middle, Box::new(self));
    }
}
