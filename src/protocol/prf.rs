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

//! Composed PRF: an HMAC-SHA256 layer keyed by the issuer derives a per-user subkey,
//! which then drives a discrete-log PRF over a G1 point. [`eval`] hashes the inner input to the curve first,
//! [`eval_point`] scales a point the caller already holds. The protocol uses the latter on the blinded
//! registrant point, so the blinding factor commutes with the evaluation.

use core::fmt;

use bls12_381_plus::{G1Projective, Scalar};
use hmac::{Hmac, Mac};
use rand::{CryptoRng, RngCore};
use sha2::Sha256;

use super::ciphersuites::OppidCiphersuite;
use crate::errors::Error;
use crate::utils::util::oppid_utils::{hash_to_curve, hash_to_scalar};

type HmacSha256 = Hmac<Sha256>;

pub const PRF_KEY_BYTES: usize = 32;

/// HMAC key of the issuer.
pub struct PrfKey([u8; PRF_KEY_BYTES]);

impl fmt::Debug for PrfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrfKey(..)")
    }
}

impl PrfKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, Error> {
        let mut key = [0u8; PRF_KEY_BYTES];
        rng.try_fill_bytes(&mut key)
            .map_err(|e| Error::KeyGenError(format!("PRF key sampling failed: {e}")))?;
        Ok(Self(key))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let key: [u8; PRF_KEY_BYTES] = bytes
            .try_into()
            .map_err(|_| Error::DeserializationError("PRF key must be 32 bytes".to_owned()))?;
        Ok(Self(key))
    }
}

/// HMAC-SHA256 of `msg` under `key`.
pub fn hmac_eval(key: &PrfKey, msg: &[u8]) -> Result<[u8; 32], Error> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(&key.0)
        .map_err(|_| Error::InvalidParameters("invalid HMAC key length".to_owned()))?;
    mac.update(msg);
    let mut tag = [0u8; 32];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Discrete-log PRF: `k·hash_to_curve(msg)` under the DL-PRF tag of the suite.
pub fn dl_eval<CS: OppidCiphersuite>(k: &Scalar, msg: &[u8]) -> Result<G1Projective, Error> {
    Ok(hash_to_curve::<CS>(msg, &CS::prf_dl_dst())? * k)
}

/// # Description
/// Evaluates the composed PRF:
/// 1. `y = HMAC-SHA256(key, outer)`
/// 2. `k = hash_to_scalar(y)`
/// 3. `k·hash_to_curve(inner)`
///
/// # Inputs:
/// * `key` (REQUIRED), issuer PRF key.
/// * `inner` (REQUIRED), input of the discrete-log layer, hashed to G1.
/// * `outer` (REQUIRED), input of the HMAC layer (the user identifier in the protocol).
///
/// # Output:
/// a G1 point or [`Error`].
///
pub fn eval<CS: OppidCiphersuite>(key: &PrfKey, inner: &[u8], outer: &[u8]) -> Result<G1Projective, Error> {
    dl_eval::<CS>(&subkey::<CS>(key, outer)?, inner)
}

/// # Description
/// Same composition as [`eval`], with the discrete-log layer applied directly to `inner`:
/// `hash_to_scalar(HMAC-SHA256(key, outer))·inner`.
///
/// Linear in `inner`, so `eval_point(key, b·P, outer) = b·eval_point(key, P, outer)`.
///
/// # Output:
/// a G1 point or [`Error`].
///
pub fn eval_point<CS: OppidCiphersuite>(
    key: &PrfKey,
    inner: &G1Projective,
    outer: &[u8],
) -> Result<G1Projective, Error> {
    Ok(inner * subkey::<CS>(key, outer)?)
}

fn subkey<CS: OppidCiphersuite>(key: &PrfKey, outer: &[u8]) -> Result<Scalar, Error> {
    let y = hmac_eval(key, outer)?;
    hash_to_scalar::<CS>(&y, &CS::prf_fk_dst())
}
