//! Deep link routing
//!
//! The router only holds a [`Weak`] reference to the screen that acts on
//! links, so binding never keeps that screen alive. Links that arrive while
//! nothing is bound are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{debug, info};
use url::Url;

/// Scheme registered by the application
pub const DEFAULT_SCHEME: &str = "sporty";

/// Something that can act on a routed deep link
pub trait DeepLinkTarget: Send + Sync {
    fn receive_deep_link(&self, link: &str);
}

/// Entry point the host uses to deliver external URIs
pub trait DeepLinkHandler {
    fn can_open(&self, uri: &str) -> bool;
    fn open(&self, uri: &str) -> RouteOutcome;
}

/// What happened to a routed URI; none of these is an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Delivered,
    Unrecognized,
    NoTarget,
}

pub struct DeepLinkRouter {
    scheme: String,
    prefix: String,
    target: Mutex<Option<Weak<dyn DeepLinkTarget>>>,
}

impl DeepLinkRouter {
    pub fn new(scheme: impl Into<String>) -> Self {
        let scheme = scheme.into();
        let prefix = format!("{}://", scheme);
        Self {
            scheme,
            prefix,
            target: Mutex::new(None),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    fn slot(&self) -> MutexGuard<'_, Option<Weak<dyn DeepLinkTarget>>> {
        self.target.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn bind<T: DeepLinkTarget + 'static>(&self, target: &Arc<T>) {
        let weak = Arc::downgrade(target);
        let weak: Weak<dyn DeepLinkTarget> = weak;
        *self.slot() = Some(weak);
        debug!(scheme = %self.scheme, "Deep link target bound");
    }

    pub fn unbind(&self) {
        *self.slot() = None;
    }

    /// True while a live target is bound
    pub fn is_bound(&self) -> bool {
        self.slot().as_ref().map_or(false, |weak| weak.strong_count() > 0)
    }

    pub fn can_route(&self, uri: &str) -> bool {
        uri.starts_with(&self.prefix)
    }

    pub fn route(&self, uri: &str) -> RouteOutcome {
        if !self.can_route(uri) {
            debug!(uri, "Ignoring link with unrecognized scheme");
            return RouteOutcome::Unrecognized;
        }

        let parameters = query_parameters(uri);
        debug!(uri, ?parameters, "Routing deep link");

        // Upgrade and release the lock before dispatching.
        let target = {
            let mut slot = self.slot();
            let target = slot.as_ref().and_then(Weak::upgrade);
            if target.is_none() {
                *slot = None;
            }
            target
        };

        match target {
            Some(target) => {
                info!(uri, "Delivering deep link");
                target.receive_deep_link(uri);
                RouteOutcome::Delivered
            }
            None => {
                debug!(uri, "No deep link target bound, dropping link");
                RouteOutcome::NoTarget
            }
        }
    }
}

impl Default for DeepLinkRouter {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME)
    }
}

impl DeepLinkHandler for DeepLinkRouter {
    fn can_open(&self, uri: &str) -> bool {
        self.can_route(uri)
    }

    fn open(&self, uri: &str) -> RouteOutcome {
        self.route(uri)
    }
}

/// Query parameters of `uri`; empty when it does not parse
pub fn query_parameters(uri: &str) -> HashMap<String, String> {
    match Url::parse(uri) {
        Ok(url) => url.query_pairs().into_owned().collect(),
        Err(_) => HashMap::new(),
    }
}
