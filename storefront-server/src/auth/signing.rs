use std::{fmt, fs, path::Path};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use storefront_config::SigningKeySource;
use thiserror::Error;
use zeroize::Zeroizing;

/// Length of the random HS256 secret generated when no key is configured.
const EPHEMERAL_SECRET_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("failed to read signing key {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {kind} key: {message}")]
    InvalidKey { kind: &'static str, message: String },
    #[error("RSA private and public keys do not belong to the same pair")]
    MismatchedKeyPair,
}

/// Where the active key material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProvenance {
    RsaPem,
    SharedSecret,
    Ephemeral,
}

impl KeyProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyProvenance::RsaPem => "rsa-pem",
            KeyProvenance::SharedSecret => "shared-secret",
            KeyProvenance::Ephemeral => "ephemeral",
        }
    }
}

/// Key material shared by token validation and token issuance.
///
/// Built once at startup and handed around behind an `Arc`; the same
/// instance must back both sides or minted tokens will not validate.
pub struct SigningConfigurations {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    provenance: KeyProvenance,
}

impl SigningConfigurations {
    pub fn from_source(source: &SigningKeySource) -> Result<Self, SigningError> {
        match source {
            SigningKeySource::RsaPem {
                private_key,
                public_key,
            } => {
                let private_pem = read_key_file(private_key)?;
                let public_pem = read_key_file(public_key)?;
                Self::from_rsa_pem(&private_pem, &public_pem)
            }
            SigningKeySource::Secret(secret) => {
                Ok(Self::from_secret(secret.as_bytes()))
            }
            SigningKeySource::Ephemeral => Ok(Self::ephemeral()),
        }
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self::hmac(secret, KeyProvenance::SharedSecret)
    }

    /// Random per-process key. Tokens signed with it die with the process.
    pub fn ephemeral() -> Self {
        let mut secret = Zeroizing::new([0u8; EPHEMERAL_SECRET_LEN]);
        rand::rng().fill_bytes(&mut secret[..]);
        Self::hmac(&secret[..], KeyProvenance::Ephemeral)
    }

    pub fn from_rsa_pem(
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, SigningError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem).map_err(
            |err| SigningError::InvalidKey {
                kind: "RSA private",
                message: err.to_string(),
            },
        )?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem).map_err(
            |err| SigningError::InvalidKey {
                kind: "RSA public",
                message: err.to_string(),
            },
        )?;

        let configurations = Self {
            algorithm: Algorithm::RS256,
            encoding_key,
            decoding_key,
            provenance: KeyProvenance::RsaPem,
        };
        configurations.verify_pair()?;
        Ok(configurations)
    }

    fn hmac(secret: &[u8], provenance: KeyProvenance) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            provenance,
        }
    }

    // Sign and verify a throwaway payload so a mixed-up pair fails at boot
    // instead of on the first request.
    fn verify_pair(&self) -> Result<(), SigningError> {
        #[derive(Serialize, Deserialize)]
        struct Probe {
            probe: String,
        }

        let token = encode(
            &Header::new(self.algorithm),
            &Probe {
                probe: "storefront".into(),
            },
            &self.encoding_key,
        )
        .map_err(|err| SigningError::InvalidKey {
            kind: "RSA private",
            message: err.to_string(),
        })?;

        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        decode::<Probe>(&token, &self.decoding_key, &validation)
            .map(|_| ())
            .map_err(|_| SigningError::MismatchedKeyPair)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    pub fn provenance(&self) -> KeyProvenance {
        self.provenance
    }
}

impl fmt::Debug for SigningConfigurations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfigurations")
            .field("algorithm", &self.algorithm)
            .field("provenance", &self.provenance)
            .finish_non_exhaustive()
    }
}

fn read_key_file(path: &Path) -> Result<Zeroizing<Vec<u8>>, SigningError> {
    fs::read(path)
        .map(Zeroizing::new)
        .map_err(|source| SigningError::Io {
            path: path.display().to_string(),
            source,
        })
}
