//! Outbound HTTP clients.
//!
//! # Design Decisions
//! - Clients are built once and shared; hyper-util pools connections per host
//! - A second client skips certificate verification. It is only picked for
//!   requests that arrived over TLS, so legacy backends with self-signed
//!   certificates keep working behind an HTTPS listener. This is insecure.
//! - The destination is an `http::Uri` built from the raw path and query, so
//!   nothing is re-encoded on the way upstream
//! - Redirects are followed, at most ten hops
//! - No request timeout: a hanging upstream holds the inbound request open

use std::sync::Arc;

use axum::body::Body;
use axum::http::uri::{InvalidUri, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use tower_http::follow_redirect::{policy::Limited, FollowRedirect};

use crate::config::UpstreamTarget;

/// Redirect hops followed before the last redirect is handed back as is.
const MAX_REDIRECTS: usize = 10;

/// Shared outbound client type.
pub type UpstreamClient = FollowRedirect<Client<HttpsConnector<HttpConnector>, Body>, Limited>;

/// How the inbound request reached the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    Plain,
    Tls,
}

/// Whether an outbound client checks upstream certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Insecure,
}

impl Inbound {
    /// Certificate policy for requests that arrived this way.
    pub fn verification(self) -> Verification {
        match self {
            Inbound::Plain => Verification::Verified,
            Inbound::Tls => Verification::Insecure,
        }
    }
}

/// The pair of outbound clients shared by all requests.
#[derive(Clone)]
pub struct UpstreamClients {
    verified: UpstreamClient,
    insecure: UpstreamClient,
}

impl UpstreamClients {
    pub fn new() -> Result<Self, rustls::Error> {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        // The listener's rustls config resolves the process-wide provider.
        let _ = CryptoProvider::install_default(provider.as_ref().clone());

        let verified = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(provider.clone())?
            .https_or_http()
            .enable_http1()
            .build();

        let insecure = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
            .with_no_client_auth();
        let insecure = HttpsConnectorBuilder::new()
            .with_tls_config(insecure)
            .https_or_http()
            .enable_http1()
            .build();

        Ok(Self {
            verified: build_client(verified),
            insecure: build_client(insecure),
        })
    }

    /// Client to use for a request that arrived over `inbound`.
    pub fn for_inbound(&self, inbound: Inbound) -> &UpstreamClient {
        match inbound.verification() {
            Verification::Verified => &self.verified,
            Verification::Insecure => &self.insecure,
        }
    }
}

fn build_client(connector: HttpsConnector<HttpConnector>) -> UpstreamClient {
    let client = Client::builder(TokioExecutor::new()).build(connector);
    FollowRedirect::with_policy(client, Limited::new(MAX_REDIRECTS))
}

/// Accepts any server certificate. Signatures are still checked so the
/// handshake itself stays well-formed.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

/// `scheme://authority` followed by the inbound path and query, verbatim.
pub fn destination_uri(upstream: &UpstreamTarget, path_and_query: &str) -> Result<Uri, InvalidUri> {
    format!("{}://{}{}", upstream.protocol, upstream.authority, path_and_query).parse()
}
