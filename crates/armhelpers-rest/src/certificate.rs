//! PEM certificate and private key loading for client-certificate auth

use armhelpers::{ArmError, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::RsaPrivateKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use sha1::{Digest, Sha1};
use std::path::Path;

const EC_PUBLIC_KEY_OID: &str = "1.2.840.10045.2.1";
const ED25519_OID: &str = "1.3.101.112";

/// Certificate plus the RSA key it was issued for
#[derive(Clone)]
pub struct ClientCertificate {
    der: Vec<u8>,
    key: RsaPrivateKey,
}

impl std::fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("thumbprint", &self.thumbprint())
            .finish_non_exhaustive()
    }
}

impl ClientCertificate {
    /// Read and parse the PEM files at `certificate_path` and `private_key_path`
    pub fn from_files(
        certificate_path: impl AsRef<Path>,
        private_key_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let certificate_path = certificate_path.as_ref();
        let private_key_path = private_key_path.as_ref();

        let cert_pem = std::fs::read(certificate_path).map_err(|e| {
            ArmError::Certificate(format!(
                "failed to read certificate file {}: {}",
                certificate_path.display(),
                e
            ))
        })?;
        let key_pem = std::fs::read(private_key_path).map_err(|e| {
            ArmError::Certificate(format!(
                "failed to read private key file {}: {}",
                private_key_path.display(),
                e
            ))
        })?;

        Self::from_pem(&cert_pem, &key_pem)
    }

    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        let der = parse_certificate(cert_pem)?;
        let key = parse_rsa_private_key(key_pem)?;
        Ok(Self { der, key })
    }

    /// DER encoding of the certificate
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.key
    }

    /// SHA-1 thumbprint of the certificate, base64url without padding
    /// (the JWT `x5t` header value)
    pub fn thumbprint(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha1::digest(&self.der))
    }

    /// Signing key for RS256 client assertions
    pub fn encoding_key(&self) -> Result<jsonwebtoken::EncodingKey> {
        let der = self
            .key
            .to_pkcs1_der()
            .map_err(|e| ArmError::Certificate(format!("failed to encode private key: {}", e)))?;
        Ok(jsonwebtoken::EncodingKey::from_rsa_der(der.as_bytes()))
    }
}

/// Decode the single `CERTIFICATE` block of `pem_bytes` and check it parses
/// as X.509
pub fn parse_certificate(pem_bytes: &[u8]) -> Result<Vec<u8>> {
    let blocks = pem::parse_many(pem_bytes)
        .map_err(|e| ArmError::Certificate(format!("failed to decode certificate: {}", e)))?;

    let mut certs = blocks.into_iter().filter(|b| b.tag() == "CERTIFICATE");
    let block = certs.next().ok_or_else(|| {
        ArmError::Certificate("failed to decode certificate: no CERTIFICATE block".to_string())
    })?;
    let chained = certs.count();
    if chained > 0 {
        tracing::debug!(chained, "Ignoring chain certificates after the first block");
    }

    let der = block.into_contents();
    let (_, cert) = x509_parser::parse_x509_certificate(&der)
        .map_err(|e| ArmError::Certificate(format!("failed to parse certificate: {}", e)))?;
    tracing::debug!(subject = %cert.subject(), "Loaded client certificate");

    Ok(der)
}

/// Decode an RSA private key stored as PKCS#1 or PKCS#8 DER inside PEM
pub fn parse_rsa_private_key(pem_bytes: &[u8]) -> Result<RsaPrivateKey> {
    let block = pem::parse(pem_bytes)
        .map_err(|e| ArmError::Certificate(format!("failed to decode private key: {}", e)))?;
    let der = block.contents();

    let pkcs1_err = match RsaPrivateKey::from_pkcs1_der(der) {
        Ok(key) => return Ok(key),
        Err(e) => e,
    };

    let info = rsa::pkcs8::PrivateKeyInfo::try_from(der).map_err(|pkcs8_err| {
        ArmError::Certificate(format!(
            "failed to parse private key as PKCS#1 or PKCS#8 ({}) ({})",
            pkcs1_err, pkcs8_err
        ))
    })?;

    if info.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
        return Err(ArmError::Certificate(format!(
            "unsupported key type: {}",
            key_type_name(&info.algorithm.oid.to_string())
        )));
    }

    RsaPrivateKey::try_from(info)
        .map_err(|e| ArmError::Certificate(format!("failed to parse RSA private key: {}", e)))
}

fn key_type_name(oid: &str) -> String {
    match oid {
        EC_PUBLIC_KEY_OID => "EC".to_string(),
        ED25519_OID => "Ed25519".to_string(),
        other => format!("OID {}", other),
    }
}
