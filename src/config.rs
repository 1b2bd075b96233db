use std::sync::Arc;

use crate::registry::{ExtensionFactory, OidDatabase, OidResolver, StandardExtensionFactory};

/// Collaborators a [`Certificate`](crate::cert::Certificate) consults while
/// parsing and signing.
///
/// The default loads only well-known extensions and names signature
/// algorithms from the `const-oid` database.
///
/// ```
/// use std::sync::Arc;
/// use certwright::config::CertificateConfig;
/// use certwright::registry::OpaqueExtensionFactory;
///
/// let config = CertificateConfig::default()
///     .with_extension_factory(Arc::new(OpaqueExtensionFactory));
/// ```
#[derive(Clone)]
pub struct CertificateConfig {
    pub extension_factory: Arc<dyn ExtensionFactory>,
    pub oid_resolver: Arc<dyn OidResolver>,
}

impl CertificateConfig {
    pub fn with_extension_factory(mut self, factory: Arc<dyn ExtensionFactory>) -> Self {
        self.extension_factory = factory;
        self
    }

    pub fn with_oid_resolver(mut self, resolver: Arc<dyn OidResolver>) -> Self {
        self.oid_resolver = resolver;
        self
    }
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            extension_factory: Arc::new(StandardExtensionFactory),
            oid_resolver: Arc::new(OidDatabase),
        }
    }
}

impl core::fmt::Debug for CertificateConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CertificateConfig").finish_non_exhaustive()
    }
}
