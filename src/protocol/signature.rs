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

//! Single-message [Pointcheval-Sanders signatures](https://eprint.iacr.org/2015/525.pdf) over BLS12-381.
//! Signatures live in G1, keys in G2, and a signature can be re-randomized into an unlinkable one
//! on the same message.

use core::fmt;
use core::marker::PhantomData;

use bls12_381_plus::{multi_miller_loop, pairing, G1Projective, G2Prepared, G2Projective, Gt, Scalar};
use elliptic_curve::group::Curve;
use rand::{CryptoRng, RngCore};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ciphersuites::OppidCiphersuite;
use crate::errors::Error;
use crate::keys::traits::PublicKey;
use crate::utils::random::{random_nonzero_scalar, random_scalar};
use crate::utils::util::oppid_utils::{
    g1_to_bytes, g2_to_bytes, hash_to_scalar, parse_g1_projective, parse_g2_projective, parse_gt,
    ScalarExt, G1_BYTES, G2_BYTES, GT_BYTES, SCALAR_BYTES,
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PsParams<CS: OppidCiphersuite> {
    pub(crate) dst: Vec<u8>,
    _cs: PhantomData<CS>,
}

/// Signing exponents `(x, y)`. Never leaves the issuer.
pub struct PsSecretKey {
    x: Scalar,
    y: Scalar,
}

impl fmt::Debug for PsSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PsSecretKey(..)")
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PsPublicKey {
    pub(crate) g: G2Projective,
    pub(crate) x: G2Projective,
    pub(crate) y: G2Projective,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PsSignature {
    pub(crate) s1: G1Projective,
    pub(crate) s2: G1Projective,
}

impl PsSecretKey {
    pub fn public_key(&self) -> PsPublicKey {
        let g = G2Projective::GENERATOR;
        PsPublicKey { g, x: g * self.x, y: g * self.y }
    }
}

impl PsPublicKey {
    pub const BYTES: usize = 3 * G2_BYTES;

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[..G2_BYTES].copy_from_slice(&g2_to_bytes(&self.g));
        bytes[G2_BYTES..2 * G2_BYTES].copy_from_slice(&g2_to_bytes(&self.x));
        bytes[2 * G2_BYTES..].copy_from_slice(&g2_to_bytes(&self.y));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::BYTES {
            return Err(Error::DeserializationError("PS public key must be 288 bytes".to_owned()));
        }
        let g = parse_g2_projective(&bytes[..G2_BYTES])?;
        let x = parse_g2_projective(&bytes[G2_BYTES..2 * G2_BYTES])?;
        let y = parse_g2_projective(&bytes[2 * G2_BYTES..])?;
        if g != G2Projective::GENERATOR {
            return Err(Error::DeserializationError("unexpected G2 base point".to_owned()));
        }
        Ok(Self { g, x, y })
    }
}

impl PublicKey for PsPublicKey {
    type Output = [u8; PsPublicKey::BYTES];

    fn to_bytes(&self) -> Self::Output {
        self.to_bytes()
    }

    fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl PsSignature {
    pub const BYTES: usize = 2 * G1_BYTES;

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[..G1_BYTES].copy_from_slice(&g1_to_bytes(&self.s1));
        bytes[G1_BYTES..].copy_from_slice(&g1_to_bytes(&self.s2));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::BYTES {
            return Err(Error::DeserializationError("PS signature must be 96 bytes".to_owned()));
        }
        let s1 = parse_g1_projective(&bytes[..G1_BYTES])?;
        let s2 = parse_g1_projective(&bytes[G1_BYTES..])?;
        Ok(Self { s1, s2 })
    }

    /// https://eprint.iacr.org/2015/525.pdf, Sec. 6.2
    ///
    /// # Description
    /// Re-randomizes the signature into `(s1·r, (s2 + t·s1)·r)`. The result verifies as a signature
    /// on the same message only once `t` is accounted for, which is what the proofs of knowledge rely on.
    ///
    /// # Output:
    /// (`t`, [`PsSignature`]) or [`Error`].
    ///
    pub fn randomize<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<(Scalar, PsSignature), Error> {
        let r = random_nonzero_scalar(rng)?;
        let t = random_scalar(rng);
        let s1 = self.s1 * r;
        let s2 = (self.s2 + self.s1 * t) * r;
        Ok((t, PsSignature { s1, s2 }))
    }

    /// `s1` must be a non-identity point of G1 for the pairing check to mean anything.
    pub(crate) fn is_well_formed(&self) -> bool {
        bool::from(self.s1.is_on_curve()) && !bool::from(self.s1.is_identity())
    }
}

impl<CS: OppidCiphersuite> PsParams<CS> {
    /// Binds the scheme to a tag. `None` falls back to `CS::signature_dst()`.
    pub fn setup(dst: Option<&[u8]>) -> Result<Self, Error> {
        let dst = dst.map(|d| d.to_vec()).unwrap_or_else(CS::signature_dst);
        if dst.is_empty() {
            return Err(Error::InvalidParameters("empty signature tag".to_owned()));
        }
        Ok(Self { dst, _cs: PhantomData })
    }

    pub fn dst(&self) -> &[u8] {
        &self.dst
    }

    pub(crate) fn message_scalar(&self, msg: &[u8]) -> Result<Scalar, Error> {
        hash_to_scalar::<CS>(msg, &self.dst)
    }

    pub fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<(PsSecretKey, PsPublicKey), Error> {
        let x = random_nonzero_scalar(rng).map_err(|e| Error::KeyGenError(e.to_string()))?;
        let y = random_nonzero_scalar(rng).map_err(|e| Error::KeyGenError(e.to_string()))?;
        let sk = PsSecretKey { x, y };
        let pk = sk.public_key();
        Ok((sk, pk))
    }

    /// # Description
    /// Signs `msg`: `s1 = u·G1`, `s2 = (x + y·H(msg))·s1` for a fresh nonzero `u`,
    /// so `s1` is never the identity.
    ///
    /// # Output:
    /// a [`PsSignature`] or [`Error`].
    ///
    pub fn sign<R: RngCore + CryptoRng>(&self, sk: &PsSecretKey, msg: &[u8], rng: &mut R) -> Result<PsSignature, Error> {
        let u = random_nonzero_scalar(rng).map_err(|e| Error::SignatureGenerationError(e.to_string()))?;
        let m = self.message_scalar(msg)?;

        let s1 = G1Projective::GENERATOR * u;
        let s2 = s1 * (sk.x + sk.y * m);

        Ok(PsSignature { s1, s2 })
    }

    /// Policy check: `e(s1, X + H(msg)·Y) == e(s2, G)`, rejecting an identity or off-curve `s1`.
    pub fn verify(&self, pk: &PsPublicKey, msg: &[u8], signature: &PsSignature) -> bool {
        if !signature.is_well_formed() {
            log::debug!("PS signature rejected: s1 is the identity or not on G1");
            return false;
        }
        let m = match self.message_scalar(msg) {
            Ok(m) => m,
            Err(_) => return false,
        };

        let xym = pk.x + pk.y * m;
        let s1 = signature.s1.to_affine();
        let s2_neg = (-signature.s2).to_affine();
        let xym_prepared = G2Prepared::from(xym.to_affine());
        let g_prepared = G2Prepared::from(pk.g.to_affine());

        let result = multi_miller_loop(&[(&s1, &xym_prepared), (&s2_neg, &g_prepared)]).final_exponentiation();

        result == Gt::IDENTITY
    }
}

/// Proof of knowledge of a PS signature on a hidden message, carried on a randomized signature.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SignatureProof {
    sig: PsSignature,
    a: Gt,
    s1: Scalar,
    s2: Scalar,
}

impl SignatureProof {
    pub const BYTES: usize = PsSignature::BYTES + GT_BYTES + 2 * SCALAR_BYTES;

    fn challenge<CS: OppidCiphersuite>(sig: &PsSignature, a: &Gt) -> Result<Scalar, Error> {
        let mut c_arr: Vec<u8> = Vec::new();
        c_arr.extend_from_slice(&sig.to_bytes());
        c_arr.extend_from_slice(&a.to_bytes());
        hash_to_scalar::<CS>(&c_arr, &CS::nizk_signature_dst())
    }

    pub fn prove<CS, R>(
        params: &PsParams<CS>,
        pk: &PsPublicKey,
        msg: &[u8],
        signature: &PsSignature,
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        CS: OppidCiphersuite,
        R: RngCore + CryptoRng,
    {
        let (t, sig) = signature.randomize(rng)?;
        let u1 = random_scalar(rng);
        let u2 = random_scalar(rng);

        let a = pairing(&sig.s1.to_affine(), &(pk.y * u1 + pk.g * u2).to_affine());
        let z = Self::challenge::<CS>(&sig, &a)?;
        let m = params.message_scalar(msg)?;

        Ok(Self { sig, a, s1: u1 + m * z, s2: u2 + t * z })
    }

    pub fn verify<CS: OppidCiphersuite>(&self, pk: &PsPublicKey) -> bool {
        if !self.sig.is_well_formed() {
            return false;
        }
        let z = match Self::challenge::<CS>(&self.sig, &self.a) {
            Ok(z) => z,
            Err(_) => return false,
        };

        let lhs = pairing(&(self.sig.s2 * z).to_affine(), &pk.g.to_affine())
            - pairing(&(self.sig.s1 * z).to_affine(), &pk.x.to_affine())
            + self.a;
        let rhs = pairing(&self.sig.s1.to_affine(), &(pk.y * self.s1 + pk.g * self.s2).to_affine());

        let valid = lhs == rhs;
        if !valid {
            log::debug!("signature proof of knowledge rejected");
        }
        valid
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::BYTES);
        bytes.extend_from_slice(&self.sig.to_bytes());
        bytes.extend_from_slice(&self.a.to_bytes());
        bytes.extend_from_slice(&self.s1.to_bytes_be());
        bytes.extend_from_slice(&self.s2.to_bytes_be());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::BYTES {
            return Err(Error::DeserializationError("invalid signature proof length".to_owned()));
        }
        let (sig_bytes, rest) = bytes.split_at(PsSignature::BYTES);
        let (a_bytes, rest) = rest.split_at(GT_BYTES);
        let (s1_bytes, s2_bytes) = rest.split_at(SCALAR_BYTES);
        Ok(Self {
            sig: PsSignature::from_bytes(sig_bytes)?,
            a: parse_gt(a_bytes)?,
            s1: Scalar::from_bytes_be(s1_bytes)?,
            s2: Scalar::from_bytes_be(s2_bytes)?,
        })
    }
}

impl Serialize for SignatureProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for SignatureProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(encoded).map_err(D::Error::custom)?;
        Self::from_bytes(&bytes).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::protocol::ciphersuites::{Bls12381Sha256, Bls12381Shake256};

    macro_rules! signature_tests {
        ( $( $t:ident: { $( $n:ident => $f:ident, )+ }, )+ ) => { $($(
            #[test] fn $n() { $f::<$t>(); }
        )+)+ }
    }

    signature_tests! {
        Bls12381Sha256: {
            sign_verify_sha256 => sign_verify,
            bit_flips_are_rejected_sha256 => bit_flips_are_rejected,
            identity_s1_is_rejected_sha256 => identity_s1_is_rejected,
            randomized_signature_sha256 => randomized_signature,
            signature_proof_sha256 => signature_proof,
        },
        Bls12381Shake256: {
            sign_verify_shake256 => sign_verify,
            bit_flips_are_rejected_shake256 => bit_flips_are_rejected,
            identity_s1_is_rejected_shake256 => identity_s1_is_rejected,
            randomized_signature_shake256 => randomized_signature,
            signature_proof_shake256 => signature_proof,
        },
    }

    fn sign_verify<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(10);
        let pp = PsParams::<CS>::setup(None).unwrap();
        let (sk, pk) = pp.key_gen(&mut rng).unwrap();
        let sig = pp.sign(&sk, b"Test-RID", &mut rng).unwrap();
        assert!(pp.verify(&pk, b"Test-RID", &sig));
        assert!(!pp.verify(&pk, b"Test-RID-2", &sig));

        let (_, other_pk) = pp.key_gen(&mut rng).unwrap();
        assert!(!pp.verify(&other_pk, b"Test-RID", &sig));

        let restored = PsPublicKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(restored, pk);
    }

    fn bit_flips_are_rejected<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(11);
        let pp = PsParams::<CS>::setup(None).unwrap();
        let (sk, pk) = pp.key_gen(&mut rng).unwrap();
        let sig = pp.sign(&sk, b"Test-RID", &mut rng).unwrap();
        assert!(pp.verify(&pk, b"Test-RID", &sig));

        let shifted_s1 = PsSignature { s1: sig.s1 + G1Projective::GENERATOR, s2: sig.s2 };
        let shifted_s2 = PsSignature { s1: sig.s1, s2: sig.s2 + G1Projective::GENERATOR };
        assert!(!pp.verify(&pk, b"Test-RID", &shifted_s1));
        assert!(!pp.verify(&pk, b"Test-RID", &shifted_s2));

        // every byte gets its low bit flipped, and the sign flag of each point (0x20 of its first byte)
        // is flipped too so that each component has at least one candidate that decodes
        let bytes = sig.to_bytes();
        let mut decoded = [0usize; 2];
        let flips = (0..PsSignature::BYTES)
            .map(|idx| (idx, 0x01u8))
            .chain([(0, 0x20u8), (G1_BYTES, 0x20u8)]);
        for (idx, mask) in flips {
            let mut tampered = bytes;
            tampered[idx] ^= mask;
            match PsSignature::from_bytes(&tampered) {
                Ok(tampered) => {
                    decoded[idx / G1_BYTES] += 1;
                    assert!(!pp.verify(&pk, b"Test-RID", &tampered), "flip at byte {idx} still verifies");
                }
                Err(e) => assert_eq!(e.kind(), crate::errors::ErrorKind::Malformed),
            }
        }
        assert!(decoded[0] > 0 && decoded[1] > 0);
    }

    fn identity_s1_is_rejected<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(12);
        let pp = PsParams::<CS>::setup(None).unwrap();
        let (_, pk) = pp.key_gen(&mut rng).unwrap();
        let forged = PsSignature { s1: G1Projective::IDENTITY, s2: G1Projective::IDENTITY };
        assert!(!pp.verify(&pk, b"Test-RID", &forged));
    }

    fn randomized_signature<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(13);
        let pp = PsParams::<CS>::setup(None).unwrap();
        let (sk, pk) = pp.key_gen(&mut rng).unwrap();
        let sig = pp.sign(&sk, b"Test-RID", &mut rng).unwrap();
        let (t, randomized) = sig.randomize(&mut rng).unwrap();
        assert_ne!(randomized, sig);

        // (s1', s2' - t·s1') is a plain signature again
        let unblinded = PsSignature { s1: randomized.s1, s2: randomized.s2 - randomized.s1 * t };
        assert!(pp.verify(&pk, b"Test-RID", &unblinded));
    }

    fn signature_proof<CS: OppidCiphersuite>() {
        let mut rng = StdRng::seed_from_u64(14);
        let pp = PsParams::<CS>::setup(None).unwrap();
        let (sk, pk) = pp.key_gen(&mut rng).unwrap();
        let sig = pp.sign(&sk, b"Test-RID", &mut rng).unwrap();

        let proof = SignatureProof::prove(&pp, &pk, b"Test-RID", &sig, &mut rng).unwrap();
        assert!(proof.verify::<CS>(&pk));

        let (_, other_pk) = pp.key_gen(&mut rng).unwrap();
        assert!(!proof.verify::<CS>(&other_pk));

        let wrong_msg = SignatureProof::prove(&pp, &pk, b"Other-RID", &sig, &mut rng).unwrap();
        assert!(!wrong_msg.verify::<CS>(&pk));

        let restored = SignatureProof::from_bytes(&proof.to_bytes()).unwrap();
        assert!(restored.verify::<CS>(&pk));
    }
}
