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

//! Pedersen commitments over G1: `C = H(msg)·G + o·H`, perfectly hiding and computationally binding.

use core::marker::PhantomData;

use bls12_381_plus::{G1Projective, Scalar};
use elliptic_curve::subtle::ConstantTimeEq;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use super::ciphersuites::OppidCiphersuite;
use crate::errors::Error;
use crate::utils::random::{random_nonzero_scalar, random_scalar};
use crate::utils::util::oppid_utils::{
    g1_to_bytes, hash_to_scalar, parse_g1_projective, ScalarExt, G1_BYTES, SCALAR_BYTES,
};

/// Public generators `(G, H)` and the tag messages are hashed under.
/// Nobody knows `log_G(H)`: the trapdoor is dropped inside [`PedersenParams::setup`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PedersenParams<CS: OppidCiphersuite> {
    pub(crate) g: G1Projective,
    pub(crate) h: G1Projective,
    pub(crate) dst: Vec<u8>,
    _cs: PhantomData<CS>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Commitment(pub(crate) G1Projective);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Opening(pub(crate) Scalar);

impl Commitment {
    pub fn to_bytes(&self) -> [u8; G1_BYTES] {
        g1_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self(parse_g1_projective(bytes)?))
    }
}

impl Opening {
    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        self.0.to_bytes_be()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self(Scalar::from_bytes_be(bytes)?))
    }
}

impl<CS: OppidCiphersuite> PedersenParams<CS> {
    /// # Description
    /// Generates the commitment parameters: `G` is the G1 generator and `H = r·G` for a random `r` that is discarded.
    ///
    /// # Inputs:
    /// * `dst` (OPTIONAL), tag under which messages are hashed to scalars. Defaults to `CS::commitment_dst()`.
    /// * `rng` (REQUIRED), a cryptographically secure RNG.
    ///
    /// # Output:
    /// [`PedersenParams`] or [`Error`].
    ///
    pub fn setup<R: RngCore + CryptoRng>(dst: Option<&[u8]>, rng: &mut R) -> Result<Self, Error> {
        let dst = dst.map(|d| d.to_vec()).unwrap_or_else(CS::commitment_dst);
        if dst.is_empty() {
            return Err(Error::InvalidParameters("empty commitment tag".to_owned()));
        }
        let trapdoor = random_nonzero_scalar(rng)?;
        let g = G1Projective::GENERATOR;
        let h = g * trapdoor;
        Ok(Self { g, h, dst, _cs: PhantomData })
    }

    pub fn dst(&self) -> &[u8] {
        &self.dst
    }

    /// Returns `G ‖ H`, compressed.
    pub fn to_bytes(&self) -> [u8; 2 * G1_BYTES] {
        let mut bytes = [0u8; 2 * G1_BYTES];
        bytes[..G1_BYTES].copy_from_slice(&g1_to_bytes(&self.g));
        bytes[G1_BYTES..].copy_from_slice(&g1_to_bytes(&self.h));
        bytes
    }

    pub fn from_bytes(bytes: &[u8], dst: Option<&[u8]>) -> Result<Self, Error> {
        if bytes.len() != 2 * G1_BYTES {
            return Err(Error::DeserializationError("commitment parameters must be 96 bytes".to_owned()));
        }
        let g = parse_g1_projective(&bytes[..G1_BYTES])?;
        let h = parse_g1_projective(&bytes[G1_BYTES..])?;
        if g != G1Projective::GENERATOR || bool::from(h.is_identity()) || h == g {
            return Err(Error::InvalidParameters("degenerate commitment generators".to_owned()));
        }
        let dst = dst.map(|d| d.to_vec()).unwrap_or_else(CS::commitment_dst);
        if dst.is_empty() {
            return Err(Error::InvalidParameters("empty commitment tag".to_owned()));
        }
        Ok(Self { g, h, dst, _cs: PhantomData })
    }

    pub(crate) fn message_scalar(&self, msg: &[u8]) -> Result<Scalar, Error> {
        hash_to_scalar::<CS>(msg, &self.dst)
    }

    fn compute(&self, m: Scalar, o: Scalar) -> G1Projective {
        self.g * m + self.h * o
    }

    /// # Description
    /// Commits to `msg` under a fresh, nonzero opening.
    ///
    /// # Output:
    /// ([`Commitment`], [`Opening`]) or [`Error`] if no nonzero opening could be sampled.
    ///
    pub fn commit<R: RngCore + CryptoRng>(&self, msg: &[u8], rng: &mut R) -> Result<(Commitment, Opening), Error> {
        let m = self.message_scalar(msg)?;
        let o = random_nonzero_scalar(rng)?;
        Ok((Commitment(self.compute(m, o)), Opening(o)))
    }

    /// Policy check: `true` iff `opening` opens `commitment` to `msg`.
    pub fn open(&self, msg: &[u8], commitment: &Commitment, opening: &Opening) -> bool {
        let m = match self.message_scalar(msg) {
            Ok(m) => m,
            Err(_) => return false,
        };
        let recomputed = self.compute(m, opening.0);
        let valid: bool = recomputed.ct_eq(&commitment.0).into();
        if !valid {
            log::debug!("commitment does not open to the supplied message");
        }
        valid
    }
}

/// Schnorr proof of knowledge of the pair `(H(msg), o)` behind a Pedersen commitment.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct OpeningProof {
    a: G1Projective,
    s1: Scalar,
    s2: Scalar,
}

impl OpeningProof {
    pub const BYTES: usize = G1_BYTES + 2 * SCALAR_BYTES;

    fn challenge<CS: OppidCiphersuite>(a: &G1Projective, commitment: &Commitment) -> Result<Scalar, Error> {
        let mut c_arr: Vec<u8> = Vec::new();
        c_arr.extend_from_slice(&g1_to_bytes(a));
        c_arr.extend_from_slice(&commitment.to_bytes());
        hash_to_scalar::<CS>(&c_arr, &CS::nizk_commitment_dst())
    }

    pub fn prove<CS, R>(
        params: &PedersenParams<CS>,
        commitment: &Commitment,
        msg: &[u8],
        opening: &Opening,
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        CS: OppidCiphersuite,
        R: RngCore + CryptoRng,
    {
        let u1 = random_scalar(rng);
        let u2 = random_scalar(rng);
        let a = params.compute(u1, u2);

        let z = Self::challenge::<CS>(&a, commitment)?;
        let m = params.message_scalar(msg)?;

        Ok(Self { a, s1: u1 + m * z, s2: u2 + opening.0 * z })
    }

    pub fn verify<CS: OppidCiphersuite>(&self, params: &PedersenParams<CS>, commitment: &Commitment) -> bool {
        let z = match Self::challenge::<CS>(&self.a, commitment) {
            Ok(z) => z,
            Err(_) => return false,
        };
        let lhs = params.compute(self.s1, self.s2);
        let rhs = self.a + commitment.0 * z;
        lhs == rhs
    }

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[..G1_BYTES].copy_from_slice(&g1_to_bytes(&self.a));
        bytes[G1_BYTES..G1_BYTES + SCALAR_BYTES].copy_from_slice(&self.s1.to_bytes_be());
        bytes[G1_BYTES + SCALAR_BYTES..].copy_from_slice(&self.s2.to_bytes_be());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::BYTES {
            return Err(Error::DeserializationError("opening proof must be 112 bytes".to_owned()));
        }
        let a = parse_g1_projective(&bytes[..G1_BYTES])?;
        let s1 = Scalar::from_bytes_be(&bytes[G1_BYTES..G1_BYTES + SCALAR_BYTES])?;
        let s2 = Scalar::from_bytes_be(&bytes[G1_BYTES + SCALAR_BYTES..])?;
        Ok(Self { a, s1, s2 })
    }
}

#[cfg(test)]
mod tests {
    use ff::Field;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::protocol::ciphersuites::{Bls12381Sha256, Bls12381Shake256};

    macro_rules! commitment_tests {
        ( $( $t:ident: { $( $n:ident => $f:ident, )+ }, )+ ) => { $($(
            #[test] fn $n() { $f::<$t>(); }
        )+)+ }
    }

    commitment_tests! {
        Bls12381Sha256: {
            commit_open_sha256 => commit_open,
            open_rejects_wrong_inputs_sha256 => open_rejects_wrong_inputs,
            opening_proof_sha256 => opening_proof,
            params_bytes_sha256 => params_bytes,
        },
        Bls12381Shake256: {
            commit_open_shake256 => commit_open,
            open_rejects_wrong_inputs_shake256 => open_rejects_wrong_inputs,
            opening_proof_shake256 => opening_proof,
            params_bytes_shake256 => params_bytes,
        },
    }

    fn commit_open<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(1);
        let pp = PedersenParams::<CS>::setup(None, &mut rng).unwrap();
        let msgs: [&[u8]; 3] = [b"Test-RID", b"", b"another relying party"];
        for msg in msgs {
            let (c, o) = pp.commit(msg, &mut rng).unwrap();
            assert!(pp.open(msg, &c, &o));
            assert_ne!(o.0, Scalar::ZERO);
        }
    }

    fn open_rejects_wrong_inputs<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(2);
        let pp = PedersenParams::<CS>::setup(None, &mut rng).unwrap();
        let (c, o) = pp.commit(b"Test-RID", &mut rng).unwrap();
        assert!(!pp.open(b"Test-RID-2", &c, &o));
        let fresh = Opening(random_nonzero_scalar(&mut rng).unwrap());
        assert!(!pp.open(b"Test-RID", &c, &fresh));

        let other = PedersenParams::<CS>::setup(Some(b"OTHER_DST"), &mut rng).unwrap();
        assert!(!other.open(b"Test-RID", &c, &o));
    }

    fn opening_proof<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(3);
        let pp = PedersenParams::<CS>::setup(None, &mut rng).unwrap();
        let (c, o) = pp.commit(b"Test-RID", &mut rng).unwrap();
        let proof = OpeningProof::prove(&pp, &c, b"Test-RID", &o, &mut rng).unwrap();
        assert!(proof.verify(&pp, &c));

        let parsed = OpeningProof::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(parsed, proof);

        let (c2, _) = pp.commit(b"Test-RID", &mut rng).unwrap();
        assert!(!proof.verify(&pp, &c2));

        let forged = OpeningProof::prove(&pp, &c, b"Other-RID", &o, &mut rng).unwrap();
        assert!(!forged.verify(&pp, &c));
    }

    fn params_bytes<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(4);
        let pp = PedersenParams::<CS>::setup(None, &mut rng).unwrap();
        let restored = PedersenParams::<CS>::from_bytes(&pp.to_bytes(), None).unwrap();
        assert_eq!(restored, pp);

        let (c, o) = pp.commit(b"Test-RID", &mut rng).unwrap();
        assert!(restored.open(b"Test-RID", &c, &o));

        let mut degenerate = pp.to_bytes();
        degenerate[G1_BYTES..].copy_from_slice(&g1_to_bytes(&G1Projective::GENERATOR));
        assert!(PedersenParams::<CS>::from_bytes(&degenerate, None).is_err());
    }
}
