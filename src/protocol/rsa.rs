// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! RSASSA-PKCS1-v1_5 over SHA-256, used by the issuer to sign tokens.

use core::fmt;

use rand::{CryptoRng, RngCore};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;

use crate::errors::Error;

pub const DEFAULT_MODULUS_BITS: usize = 2048;
pub const MIN_MODULUS_BITS: usize = 1024;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RsaParams {
    modulus_bits: usize,
}

pub struct RsaSecretKey {
    signing_key: SigningKey<Sha256>,
}

impl fmt::Debug for RsaSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RsaSecretKey(..)")
    }
}

/// Public key together with its SubjectPublicKeyInfo DER encoding.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RsaVerificationKey {
    key: RsaPublicKey,
    der: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RsaSignature(#[serde(with = "hex::serde")] pub(crate) Vec<u8>);

impl RsaParams {
    /// `None` selects [`DEFAULT_MODULUS_BITS`].
    pub fn setup(modulus_bits: Option<usize>) -> Result<Self, Error> {
        let modulus_bits = modulus_bits.unwrap_or(DEFAULT_MODULUS_BITS);
        if modulus_bits < MIN_MODULUS_BITS {
            return Err(Error::InvalidParameters(format!(
                "RSA modulus of {modulus_bits} bits is below the {MIN_MODULUS_BITS}-bit minimum"
            )));
        }
        Ok(Self { modulus_bits })
    }

    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }

    pub fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<(RsaSecretKey, RsaVerificationKey), Error> {
        let private_key =
            RsaPrivateKey::new(rng, self.modulus_bits).map_err(|e| Error::KeyGenError(e.to_string()))?;
        let public_key = RsaVerificationKey::new(private_key.to_public_key())
            .map_err(|e| Error::KeyGenError(e.to_string()))?;
        Ok((RsaSecretKey { signing_key: SigningKey::<Sha256>::new(private_key) }, public_key))
    }

    pub fn sign(&self, sk: &RsaSecretKey, msg: &[u8]) -> Result<RsaSignature, Error> {
        let signature: Signature = sk
            .signing_key
            .try_sign(msg)
            .map_err(|e| Error::SignatureGenerationError(e.to_string()))?;
        Ok(RsaSignature(signature.to_vec()))
    }

    /// Policy check: `true` iff `signature` is a valid PKCS#1 v1.5 signature on `msg`.
    pub fn verify(&self, pk: &RsaVerificationKey, msg: &[u8], signature: &RsaSignature) -> bool {
        let signature = match Signature::try_from(signature.0.as_slice()) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        let verifying_key = VerifyingKey::<Sha256>::new(pk.key.clone());
        verifying_key.verify(msg, &signature).is_ok()
    }
}

impl RsaVerificationKey {
    fn new(key: RsaPublicKey) -> Result<Self, Error> {
        let der = key
            .to_public_key_der()
            .map_err(|e| Error::DeserializationError(e.to_string()))?
            .as_bytes()
            .to_vec();
        Ok(Self { key, der })
    }

    /// SubjectPublicKeyInfo DER encoding.
    pub fn to_bytes(&self) -> &[u8] {
        &self.der
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let key = RsaPublicKey::from_public_key_der(bytes).map_err(|e| Error::DeserializationError(e.to_string()))?;
        Self::new(key)
    }
}

impl Serialize for RsaVerificationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.der))
    }
}

impl<'de> Deserialize<'de> for RsaVerificationKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let der = hex::decode(encoded).map_err(D::Error::custom)?;
        Self::from_bytes(&der).map_err(D::Error::custom)
    }
}

impl RsaSignature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}
