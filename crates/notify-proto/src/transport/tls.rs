//! Client-side TLS upgrade.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream as ClientTlsStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{
    ClientConfig, DigitallySignedStruct, Error as RustlsError, RootCertStore, SignatureScheme,
};
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

use super::error::TransportError;

/// TLS settings for outbound connections.
#[derive(Debug, Clone)]
pub struct TlsOptions {
    /// Verify the server certificate against the system roots.
    ///
    /// Turning this off accepts any certificate and is only meant for
    /// self-signed test servers.
    pub verify_certificates: bool,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            verify_certificates: true,
        }
    }
}

/// Certificate verifier that accepts every server certificate.
#[derive(Debug)]
pub(crate) struct DangerousNoVerifier;

impl ServerCertVerifier for DangerousNoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

fn client_config(options: &TlsOptions) -> ClientConfig {
    if options.verify_certificates {
        let mut roots = RootCertStore::empty();
        let certs = rustls_native_certs::load_native_certs();
        for cert in certs.certs {
            if let Err(e) = roots.add(cert) {
                warn!("Failed to add root cert: {}", e);
            }
        }
        for e in &certs.errors {
            warn!("Error loading native certs: {}", e);
        }
        ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth()
    } else {
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousNoVerifier))
            .with_no_client_auth()
    }
}

/// Upgrades a TCP stream to TLS, using `hostname` for SNI and verification.
pub(crate) async fn upgrade_to_tls(
    tcp_stream: TcpStream,
    hostname: &str,
    options: &TlsOptions,
) -> Result<ClientTlsStream<TcpStream>, TransportError> {
    let connector = TlsConnector::from(Arc::new(client_config(options)));
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| TransportError::InvalidServerName(hostname.to_string()))?;

    let tls_stream = connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|source| TransportError::Tls {
            host: hostname.to_string(),
            source,
        })?;
    debug!(hostname = %hostname, verify = options.verify_certificates, "TLS handshake completed");

    Ok(tls_stream)
}
