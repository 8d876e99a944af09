// crates/webhook-notifier/src/trust.rs
// ============================================================================
// Module: TLS Trust Roots
// Description: Custom certificate trust stores for outbound webhook calls.
// Purpose: Let a single notifier trust a private CA without global TLS state.
// Dependencies: rustls, rustls-pki-types
// ============================================================================

//! ## Overview
//! [`TrustRoot`] parses PEM or DER certificates into a rustls root store.
//! A notifier built with a trust root validates servers against exactly those
//! certificates; the platform roots are not consulted.
//! Invariants:
//! - A trust root always holds at least one certificate.
//! - Parsing untrusted bytes returns errors and never panics.
//!
//! Security posture: trust root bytes come from configuration and are treated
//! as untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use rustls::ClientConfig;
use rustls::RootCertStore;
use rustls::crypto::aws_lc_rs;
use rustls_pki_types::CertificateDer;
use rustls_pki_types::pem::PemObject;

use crate::error::ConfigurationError;

// ============================================================================
// SECTION: Trust Root
// ============================================================================

/// Certificate set used to validate webhook servers.
#[derive(Debug, Clone)]
pub struct TrustRoot {
    /// Parsed trust anchors.
    roots: Arc<RootCertStore>,
}

impl TrustRoot {
    /// Parses one or more PEM-encoded certificates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidTrustRoot`] when the input holds no
    /// certificates or any certificate is malformed.
    pub fn from_pem(pem: &[u8]) -> Result<Self, ConfigurationError> {
        let mut store = RootCertStore::empty();
        for cert in CertificateDer::pem_slice_iter(pem) {
            let cert = cert.map_err(|err| ConfigurationError::InvalidTrustRoot(err.to_string()))?;
            add_certificate(&mut store, cert)?;
        }
        Self::from_store(store)
    }

    /// Parses a single DER-encoded certificate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidTrustRoot`] when the certificate is malformed.
    pub fn from_der(der: &[u8]) -> Result<Self, ConfigurationError> {
        let mut store = RootCertStore::empty();
        add_certificate(&mut store, CertificateDer::from(der.to_vec()))?;
        Self::from_store(store)
    }

    /// Wraps a non-empty store.
    fn from_store(store: RootCertStore) -> Result<Self, ConfigurationError> {
        if store.is_empty() {
            return Err(ConfigurationError::InvalidTrustRoot(
                "no certificates found".to_string(),
            ));
        }
        Ok(Self {
            roots: Arc::new(store),
        })
    }

    /// Number of trusted certificates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns true when no certificates are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Builds a rustls client config that trusts only these roots.
    ///
    /// The crypto provider is passed explicitly so no process default is installed.
    pub(crate) fn client_config(&self) -> Result<ClientConfig, ConfigurationError> {
        let provider = Arc::new(aws_lc_rs::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|err| ConfigurationError::InvalidTrustRoot(err.to_string()))?
            .with_root_certificates(Arc::clone(&self.roots))
            .with_no_client_auth();
        Ok(config)
    }
}

/// Adds a certificate to the store, rejecting malformed anchors.
fn add_certificate(
    store: &mut RootCertStore,
    cert: CertificateDer<'static>,
) -> Result<(), ConfigurationError> {
    store.add(cert).map_err(|err| ConfigurationError::InvalidTrustRoot(err.to_string()))
}
