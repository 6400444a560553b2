//! Client TLS profile for encrypted broker endpoints.
//!
//! TLS 1.2 is the floor, TLS 1.3 is allowed, and only ECDHE key exchange
//! with AES-GCM is offered. ECDSA-authenticated TLS 1.2 suites are left out,
//! matching the `ECDHE+AESGCM:!ECDSA` profile brokers such as Amazon MQ
//! expect.

use std::sync::Arc;

use rustls::crypto::{ring, CryptoProvider};
use rustls::{CipherSuite, ClientConfig, RootCertStore};

pub const ALLOWED_CIPHER_SUITES: &[CipherSuite] = &[
    CipherSuite::TLS13_AES_256_GCM_SHA384,
    CipherSuite::TLS13_AES_128_GCM_SHA256,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
];

fn restricted_provider() -> CryptoProvider {
    let base = ring::default_provider();
    let cipher_suites = base
        .cipher_suites
        .iter()
        .filter(|suite| ALLOWED_CIPHER_SUITES.contains(&suite.suite()))
        .copied()
        .collect();
    CryptoProvider {
        cipher_suites,
        ..base
    }
}

/// Builds the client config, trusting the webpki root set.
pub fn client_config() -> Result<ClientConfig, rustls::Error> {
    let roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    Ok(
        ClientConfig::builder_with_provider(Arc::new(restricted_provider()))
            .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])?
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}
