//! Request routing
//!
//! Every intercepted request is handled by exactly one [`Strategy`], picked
//! by [`Router::classify`] from the request path alone. First match wins:
//!
//! 1. static set entry or 3D model extension -> cache-first
//! 2. API prefix -> network-first
//! 3. anything else -> stale-while-revalidate

use crate::config::schema::CacheConfig;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Caching strategy applied to one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Serve from any partition, fall back to network and store in static
    CacheFirst,
    /// Serve from network and store in dynamic, fall back to any partition
    NetworkFirst,
    /// Serve dynamic copy immediately while refreshing it in the background
    StaleWhileRevalidate,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheFirst => write!(f, "cache-first"),
            Self::NetworkFirst => write!(f, "network-first"),
            Self::StaleWhileRevalidate => write!(f, "stale-while-revalidate"),
        }
    }
}

/// Routing table built from configuration
#[derive(Debug, Clone)]
pub struct Router {
    static_paths: HashSet<String>,
    model_extensions: Vec<String>,
    api_prefix: String,
}

impl Router {
    pub fn new(
        static_files: impl IntoIterator<Item = impl Into<String>>,
        model_extensions: impl IntoIterator<Item = impl Into<String>>,
        api_prefix: impl Into<String>,
    ) -> Self {
        Self {
            static_paths: static_files.into_iter().map(Into::into).collect(),
            model_extensions: model_extensions.into_iter().map(Into::into).collect(),
            api_prefix: api_prefix.into(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.static_files.iter().cloned(),
            config.model_extensions.iter().cloned(),
            config.api_prefix.clone(),
        )
    }

    /// Pick the strategy for a request path.
    ///
    /// Static set entries are compared against the path verbatim, so absolute
    /// entries (vendor scripts on another host) never match and fall through
    /// to the later rules.
    pub fn classify(&self, path: &str) -> Strategy {
        if self.static_paths.contains(path) || self.is_model(path) {
            Strategy::CacheFirst
        } else if !self.api_prefix.is_empty() && path.starts_with(&self.api_prefix) {
            Strategy::NetworkFirst
        } else {
            Strategy::StaleWhileRevalidate
        }
    }

    fn is_model(&self, path: &str) -> bool {
        self.model_extensions
            .iter()
            .any(|ext| !ext.is_empty() && path.ends_with(ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::from_config(&CacheConfig::default())
    }

    #[test]
    fn static_set_is_cache_first() {
        let router = router();
        for path in ["/", "/index.html", "/styles.css", "/Assets/cover.jpg"] {
            assert_eq!(router.classify(path), Strategy::CacheFirst, "{path}");
        }
    }

    #[test]
    fn models_are_cache_first() {
        let router = router();
        assert_eq!(router.classify("/Assets/rack3.glb"), Strategy::CacheFirst);
        assert_eq!(router.classify("/Assets/other.usdz"), Strategy::CacheFirst);
        assert_eq!(router.classify("/models/new.glb"), Strategy::CacheFirst);
    }

    #[test]
    fn api_is_network_first() {
        let router = router();
        assert_eq!(router.classify("/api/quote"), Strategy::NetworkFirst);
        assert_eq!(router.classify("/api/"), Strategy::NetworkFirst);
        assert_eq!(router.classify("/apis"), Strategy::StaleWhileRevalidate);
    }

    #[test]
    fn model_under_api_is_cache_first() {
        assert_eq!(router().classify("/api/model.glb"), Strategy::CacheFirst);
    }

    #[test]
    fn everything_else_is_stale_while_revalidate() {
        let router = router();
        assert_eq!(router.classify("/about.html"), Strategy::StaleWhileRevalidate);
        assert_eq!(router.classify("/Assets/visor.png"), Strategy::StaleWhileRevalidate);
        assert_eq!(
            router.classify("/@google/model-viewer/dist/model-viewer.min.js"),
            Strategy::StaleWhileRevalidate
        );
    }

    #[test]
    fn matching_is_exact() {
        let router = router();
        assert_eq!(router.classify("/index.html/"), Strategy::StaleWhileRevalidate);
        assert_eq!(router.classify("/INDEX.HTML"), Strategy::StaleWhileRevalidate);
        assert_eq!(router.classify("/Assets/rack3.GLB"), Strategy::StaleWhileRevalidate);
    }

    #[test]
    fn strategy_display() {
        assert_eq!(Strategy::CacheFirst.to_string(), "cache-first");
        assert_eq!(Strategy::NetworkFirst.to_string(), "network-first");
        assert_eq!(
            Strategy::StaleWhileRevalidate.to_string(),
            "stale-while-revalidate"
        );
    }
}
