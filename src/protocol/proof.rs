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

//! Combined proof of knowledge of an opening of a Pedersen commitment and of a PS signature
//! on the same committed message. Two Schnorr-style sigma protocols share one Fiat-Shamir
//! challenge and the response `r1` on the message, which is what ties the committed value to
//! the signed value.

use bls12_381_plus::{pairing, G1Projective, Gt, Scalar};
use elliptic_curve::group::Curve;
use rand::{CryptoRng, RngCore};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ciphersuites::OppidCiphersuite;
use super::commitment::{Commitment, Opening, PedersenParams};
use super::signature::{PsPublicKey, PsSignature};
use crate::errors::Error;
use crate::utils::random::random_scalar;
use crate::utils::util::oppid_utils::{
    g1_to_bytes, hash_to_scalar, parse_g1_projective, parse_gt, ScalarExt, G1_BYTES, GT_BYTES, SCALAR_BYTES,
};

/// Secret inputs of the prover.
#[derive(Clone, Copy, Debug)]
pub struct Witness<'a> {
    pub msg: &'a [u8],
    pub signature: &'a PsSignature,
    pub opening: &'a Opening,
}

/// Inputs known to both prover and verifier.
#[derive(Clone, Copy, Debug)]
pub struct PublicInputs<'a, CS: OppidCiphersuite> {
    pub pc: &'a PedersenParams<CS>,
    pub pk: &'a PsPublicKey,
    pub commitment: &'a Commitment,
}

/// `(sig', A1, A2, r1, r2, r3)`
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ComSigProof {
    sig: PsSignature,
    a1: G1Projective,
    a2: Gt,
    r1: Scalar,
    r2: Scalar,
    r3: Scalar,
}

fn challenge<CS: OppidCiphersuite>(
    commitment: &Commitment,
    a1: &G1Projective,
    a2: &Gt,
    aux: &[u8],
) -> Result<Scalar, Error> {
    let mut c_arr: Vec<u8> = Vec::with_capacity(G1_BYTES * 2 + GT_BYTES + aux.len());
    c_arr.extend_from_slice(&commitment.to_bytes());
    c_arr.extend_from_slice(&g1_to_bytes(a1));
    c_arr.extend_from_slice(&a2.to_bytes());
    c_arr.extend_from_slice(aux);
    hash_to_scalar::<CS>(&c_arr, &CS::nizk_com_sig_dst())
}

impl ComSigProof {
    pub const BYTES: usize = PsSignature::BYTES + G1_BYTES + GT_BYTES + 3 * SCALAR_BYTES;

    /// # Description
    /// Proves knowledge of `(msg, o, sig)` such that `commitment = Commit(msg, o)` and `sig` is a PS signature on `msg`.
    ///
    /// # Inputs:
    /// * `witness` (REQUIRED), message, credential and opening.
    /// * `public` (REQUIRED), commitment parameters, issuer key and commitment.
    /// * `aux` (REQUIRED), context bytes mixed into the challenge; the proof is only valid for the same `aux`.
    /// * `rng` (REQUIRED), a cryptographically secure RNG.
    ///
    /// # Output:
    /// a [`ComSigProof`] or [`Error`].
    ///
    pub fn prove<CS, R>(
        witness: &Witness<'_>,
        public: &PublicInputs<'_, CS>,
        aux: &[u8],
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        CS: OppidCiphersuite,
        R: RngCore + CryptoRng,
    {
        let (t, sig) = witness
            .signature
            .randomize(rng)
            .map_err(|e| Error::ProofGenError(e.to_string()))?;

        let u1 = random_scalar(rng);
        let u2 = random_scalar(rng);
        let u3 = random_scalar(rng);

        let a1 = public.pc.g * u1 + public.pc.h * u2;
        let a2 = pairing(&sig.s1.to_affine(), &(public.pk.y * u1 + public.pk.g * u3).to_affine());

        let z = challenge::<CS>(public.commitment, &a1, &a2, aux)?;
        let m = public.pc.message_scalar(witness.msg)?;

        Ok(Self {
            sig,
            a1,
            a2,
            r1: u1 + m * z,
            r2: u2 + witness.opening.0 * z,
            r3: u3 + t * z,
        })
    }

    /// Policy check: `true` iff both the commitment relation and the signature relation hold for the challenge
    /// recomputed over `(commitment, A1, A2, aux)`.
    pub fn verify<CS: OppidCiphersuite>(&self, public: &PublicInputs<'_, CS>, aux: &[u8]) -> bool {
        if !self.sig.is_well_formed() {
            log::debug!("proof carries a degenerate randomized signature");
            return false;
        }
        let z = match challenge::<CS>(public.commitment, &self.a1, &self.a2, aux) {
            Ok(z) => z,
            Err(_) => return false,
        };

        // r1·G + r2·H == z·C + A1
        let lhs1 = public.pc.g * self.r1 + public.pc.h * self.r2;
        let rhs1 = public.commitment.0 * z + self.a1;
        let valid_commitment = lhs1 == rhs1;
        if !valid_commitment {
            log::debug!("commitment relation does not hold");
        }

        // e(z·s2', G) - e(z·s1', X) + A2 == e(s1', r1·Y + r3·G)
        let pk = public.pk;
        let lhs2 = pairing(&(self.sig.s2 * z).to_affine(), &pk.g.to_affine())
            - pairing(&(self.sig.s1 * z).to_affine(), &pk.x.to_affine())
            + self.a2;
        let rhs2 = pairing(&self.sig.s1.to_affine(), &(pk.y * self.r1 + pk.g * self.r3).to_affine());
        let valid_signature = lhs2 == rhs2;
        if !valid_signature {
            log::debug!("signature relation does not hold");
        }

        valid_commitment && valid_signature
    }

    /// `sig' ‖ A1 ‖ A2 ‖ r1 ‖ r2 ‖ r3`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::BYTES);
        bytes.extend_from_slice(&self.sig.to_bytes());
        bytes.extend_from_slice(&g1_to_bytes(&self.a1));
        bytes.extend_from_slice(&self.a2.to_bytes());
        bytes.extend_from_slice(&self.r1.to_bytes_be());
        bytes.extend_from_slice(&self.r2.to_bytes_be());
        bytes.extend_from_slice(&self.r3.to_bytes_be());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::BYTES {
            return Err(Error::DeserializationError(format!(
                "proof must be {} bytes, got {}",
                Self::BYTES,
                bytes.len()
            )));
        }
        let (sig_bytes, rest) = bytes.split_at(PsSignature::BYTES);
        let (a1_bytes, rest) = rest.split_at(G1_BYTES);
        let (a2_bytes, rest) = rest.split_at(GT_BYTES);
        let (r1_bytes, rest) = rest.split_at(SCALAR_BYTES);
        let (r2_bytes, r3_bytes) = rest.split_at(SCALAR_BYTES);

        Ok(Self {
            sig: PsSignature::from_bytes(sig_bytes)?,
            a1: parse_g1_projective(a1_bytes)?,
            a2: parse_gt(a2_bytes)?,
            r1: Scalar::from_bytes_be(r1_bytes)?,
            r2: Scalar::from_bytes_be(r2_bytes)?,
            r3: Scalar::from_bytes_be(r3_bytes)?,
        })
    }
}

impl Serialize for ComSigProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for ComSigProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(encoded).map_err(D::Error::custom)?;
        Self::from_bytes(&bytes).map_err(D::Error::custom)
    }
}
