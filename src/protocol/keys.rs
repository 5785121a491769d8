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

use core::fmt;

use serde::{Deserialize, Serialize};

use super::prf::PrfKey;
use super::rsa::{RsaSecretKey, RsaVerificationKey};
use super::signature::{PsPublicKey, PsSecretKey};
use crate::errors::Error;
use crate::keys::traits::PublicKey;

/// Secrets of the identity provider. Not `Clone`: the key stays with the party that generated it,
/// and session artifacts only ever borrow it.
pub struct IssuerSecretKey {
    pub(crate) rsa: RsaSecretKey,
    pub(crate) ps: PsSecretKey,
    pub(crate) prf: PrfKey,
}

impl fmt::Debug for IssuerSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuerSecretKey")
            .field("rsa", &self.rsa)
            .field("ps", &self.ps)
            .field("prf", &self.prf)
            .finish()
    }
}

impl IssuerSecretKey {
    /// PS verification key matching the signing key, used by the issuer to check proofs against its own key.
    pub fn ps_public_key(&self) -> PsPublicKey {
        self.ps.public_key()
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IssuerPublicKey {
    pub(crate) rsa: RsaVerificationKey,
    pub(crate) ps: PsPublicKey,
}

impl IssuerPublicKey {
    pub fn rsa(&self) -> &RsaVerificationKey {
        &self.rsa
    }

    pub fn ps(&self) -> &PsPublicKey {
        &self.ps
    }

    /// `ps_pk (288 bytes) ‖ rsa_pk (DER)`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PsPublicKey::BYTES + self.rsa.to_bytes().len());
        bytes.extend_from_slice(&self.ps.to_bytes());
        bytes.extend_from_slice(self.rsa.to_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() <= PsPublicKey::BYTES {
            return Err(Error::DeserializationError("issuer public key is too short".to_owned()));
        }
        let (ps_bytes, rsa_bytes) = bytes.split_at(PsPublicKey::BYTES);
        Ok(Self {
            ps: PsPublicKey::from_bytes(ps_bytes)?,
            rsa: RsaVerificationKey::from_bytes(rsa_bytes)?,
        })
    }
}

impl PublicKey for IssuerPublicKey {
    type Output = Vec<u8>;

    fn to_bytes(&self) -> Self::Output {
        self.to_bytes()
    }

    fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }
}
