//! MSBuild namespace handling
//!
//! Tags are compared against a plain vocabulary (`ItemGroup`, `PropertyGroup`,
//! ...) after the MSBuild namespace is removed from their qualified form.

use std::collections::HashMap;
use std::sync::Arc;

/// Namespace URI used by MSBuild 2003 project files
pub const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Qualified-name prefix (`{namespace}`) carried by every MSBuild tag
pub const MSBUILD_PREFIX: &str = "{http://schemas.microsoft.com/developer/msbuild/2003}";

/// Check whether a qualified tag belongs to the MSBuild namespace
pub fn is_namespaced(tag: &str) -> bool {
    tag.starts_with(MSBUILD_PREFIX)
}

/// Strip the MSBuild namespace prefix from a qualified tag.
///
/// Any other input, including tags from foreign namespaces, is returned as is.
pub fn strip_namespace(tag: &str) -> &str {
    tag.strip_prefix(MSBUILD_PREFIX).unwrap_or(tag)
}

/// Hit/miss counters of a [`NamespaceNormalizer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizerStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Memoizing wrapper around [`strip_namespace`].
///
/// The same handful of tags repeats within and across project files, so one
/// normalizer is kept for a whole survey run.
#[derive(Debug, Default)]
pub struct NamespaceNormalizer {
    cache: HashMap<String, Arc<str>>,
    hits: usize,
    misses: usize,
}

impl NamespaceNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the namespace-stripped form of `tag`
    pub fn normalize(&mut self, tag: &str) -> Arc<str> {
        if let Some(local) = self.cache.get(tag) {
            self.hits += 1;
            return Arc::clone(local);
        }

        self.misses += 1;
        let local: Arc<str> = Arc::from(strip_namespace(tag));
        self.cache.insert(tag.to_string(), Arc::clone(&local));
        local
    }

    pub fn stats(&self) -> NormalizerStats {
        NormalizerStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.cache.len(),
        }
    }
}
