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

//! Orchestration of the OPPID protocol between a relying party (RP) and an identity provider (IdP).
//!
//! ```text
//!   IdP                                   RP
//!   setup, key_gen
//!   register(rid) ------ credential ----> (offline, once per RP)
//!                                         init(rid) -> (opening, commitment)
//!         <-------------- commitment ---- (sid chosen for the session)
//!                                         request(...) -> auth
//!         <-------------- auth ----------
//!   response(uid, ctx, sid) -> token ---->
//!                                         finalize(...) -> (finalized token, ppid)
//!   anyone: verify(rid, ppid, ctx, sid, finalized token)
//! ```
//!
//! Every call is a pure function of its inputs; no session state is kept here.

use bls12_381_plus::{G1Projective, Scalar};
use elliptic_curve::subtle::ConstantTimeEq;
use rand::{CryptoRng, RngCore};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ciphersuites::OppidCiphersuite;
use super::commitment::{Commitment, Opening, PedersenParams};
use super::keys::{IssuerPublicKey, IssuerSecretKey};
use super::prf;
use super::proof::{ComSigProof, PublicInputs, Witness};
use super::rsa::{RsaParams, RsaSignature};
use super::signature::{PsParams, PsSignature};
use crate::errors::Error;
use crate::keys::pair::KeyPair;
use crate::schemes::algorithms::Oppid;
use crate::utils::random::random_scalar_not_one;
use crate::utils::util::oppid_utils::{
    g1_to_bytes, hash_to_curve, i2osp, parse_g1_projective, ScalarExt, G1_BYTES, SCALAR_BYTES,
};

/// Parameters shared by every party. The commitment scheme and the signature scheme are built
/// from the same protocol tag, so the message scalar is identical on both sides of the proof.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PublicParameters<CS: OppidCiphersuite> {
    rsa: RsaParams,
    dst: Vec<u8>,
    pc: PedersenParams<CS>,
    ps: PsParams<CS>,
}

/// PS signature of the IdP on a registrant identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Credential {
    sig: PsSignature,
}

/// Sent by the RP: commitment to `rid` and `bx = b·H(rid)`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UserCommitment {
    com: Commitment,
    bx: G1Projective,
}

/// Kept by the RP for the session: commitment opening and blinding factor `b`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UserOpening {
    opening: Opening,
    b: Scalar,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Auth {
    proof: ComSigProof,
}

/// RSA signature over the token bytes, and the blinded evaluation `by`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    sig: RsaSignature,
    by: G1Projective,
}

/// Everything needed to re-check a pseudonym later, without the live session.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FinalizedToken {
    com: Commitment,
    opening: Opening,
    b: Scalar,
    by: G1Projective,
    sig: RsaSignature,
}

/// Pairwise pseudonymous identifier: compressed encoding of `b⁻¹·by`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct PairwiseIdentifier([u8; G1_BYTES]);

impl<CS: OppidCiphersuite> PublicParameters<CS> {
    /// # Description
    /// Generates the public parameters of the protocol.
    ///
    /// # Inputs:
    /// * `rsa_modulus_bits` (OPTIONAL), size of the RSA modulus used for tokens. Defaults to 2048, minimum 1024.
    /// * `rng` (REQUIRED), a cryptographically secure RNG.
    ///
    /// # Output:
    /// [`PublicParameters`] or [`Error`].
    ///
    pub fn setup<R: RngCore + CryptoRng>(rsa_modulus_bits: Option<usize>, rng: &mut R) -> Result<Self, Error> {
        let rsa = RsaParams::setup(rsa_modulus_bits)?;
        let dst = CS::com_sig_dst();
        let pc = PedersenParams::setup(Some(&dst), rng)?;
        let ps = PsParams::setup(Some(&dst))?;
        Ok(Self { rsa, dst, pc, ps })
    }

    /// Tag shared by the commitment and the signature scheme.
    pub fn dst(&self) -> &[u8] {
        &self.dst
    }

    pub fn commitment_params(&self) -> &PedersenParams<CS> {
        &self.pc
    }

    pub fn signature_params(&self) -> &PsParams<CS> {
        &self.ps
    }

    pub fn rsa_params(&self) -> &RsaParams {
        &self.rsa
    }

    pub fn key_gen<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<KeyPair<Oppid<CS>>, Error> {
        let (rsa_sk, rsa_pk) = self.rsa.key_gen(rng)?;
        let (ps_sk, ps_pk) = self.ps.key_gen(rng)?;
        let prf_key = prf::PrfKey::generate(rng)?;

        let sk = IssuerSecretKey { rsa: rsa_sk, ps: ps_sk, prf: prf_key };
        let pk = IssuerPublicKey { rsa: rsa_pk, ps: ps_pk };
        Ok(KeyPair::new(sk, pk))
    }

    /// The IdP signs `rid` once, when the RP registers.
    pub fn register<R: RngCore + CryptoRng>(
        &self,
        isk: &IssuerSecretKey,
        rid: &[u8],
        rng: &mut R,
    ) -> Result<Credential, Error> {
        Ok(Credential { sig: self.ps.sign(&isk.ps, rid, rng)? })
    }

    fn blind_rid(&self, b: &Scalar, rid: &[u8]) -> Result<G1Projective, Error> {
        Ok(hash_to_curve::<CS>(rid, &CS::protocol_dst())? * b)
    }

    /// # Description
    /// Starts a session on the RP side: commits to `rid` and blinds its hash with a fresh `b ∉ {0, 1}`.
    ///
    /// # Output:
    /// ([`UserOpening`], [`UserCommitment`]) or [`Error`].
    ///
    pub fn init<R: RngCore + CryptoRng>(&self, rid: &[u8], rng: &mut R) -> Result<(UserOpening, UserCommitment), Error> {
        let (com, opening) = self.pc.commit(rid, rng)?;
        let b = random_scalar_not_one(rng)?;
        let bx = self.blind_rid(&b, rid)?;
        Ok((UserOpening { opening, b }, UserCommitment { com, bx }))
    }

    /// # Description
    /// Builds the authentication proof. Before proving, the RP checks its own inputs so that the IdP is never
    /// asked to vouch for an inconsistent request.
    ///
    /// # Inputs:
    /// * `ipk` (REQUIRED), IdP public key.
    /// * `rid` (REQUIRED), registrant identifier of the RP.
    /// * `cred` (REQUIRED), credential obtained at registration.
    /// * `crid` (REQUIRED), commitment sent to the IdP.
    /// * `orid` (REQUIRED), matching opening.
    /// * `sid` (REQUIRED), session identifier.
    /// * `rng` (REQUIRED), a cryptographically secure RNG.
    ///
    /// # Output:
    /// an [`Auth`], or [`Error::BlindingMismatch`], [`Error::CommitmentMismatch`], [`Error::InvalidCredential`].
    ///
    #[allow(clippy::too_many_arguments)]
    pub fn request<R: RngCore + CryptoRng>(
        &self,
        ipk: &IssuerPublicKey,
        rid: &[u8],
        cred: &Credential,
        crid: &UserCommitment,
        orid: &UserOpening,
        sid: &[u8],
        rng: &mut R,
    ) -> Result<Auth, Error> {
        let bx = self.blind_rid(&orid.b, rid)?;
        if bx != crid.bx {
            log::debug!("request aborted: blinded rid does not match the blinding factor");
            return Err(Error::BlindingMismatch);
        }
        if !self.pc.open(rid, &crid.com, &orid.opening) {
            return Err(Error::CommitmentMismatch);
        }
        if !self.ps.verify(&ipk.ps, rid, &cred.sig) {
            return Err(Error::InvalidCredential);
        }

        let witness = Witness { msg: rid, signature: &cred.sig, opening: &orid.opening };
        let public = PublicInputs { pc: &self.pc, pk: &ipk.ps, commitment: &crid.com };
        let proof = ComSigProof::prove(&witness, &public, &aux_bytes(&bx, sid), rng)?;
        Ok(Auth { proof })
    }

    /// # Description
    /// IdP side: checks the proof against its own PS key, evaluates the composed PRF on `(bx, uid)` and signs the token.
    ///
    /// # Output:
    /// a [`Token`], or [`Error::InvalidProof`].
    ///
    pub fn response(
        &self,
        isk: &IssuerSecretKey,
        auth: &Auth,
        crid: &UserCommitment,
        uid: &[u8],
        ctx: &[u8],
        sid: &[u8],
    ) -> Result<Token, Error> {
        let ps_pk = isk.ps_public_key();
        let public = PublicInputs { pc: &self.pc, pk: &ps_pk, commitment: &crid.com };
        if !auth.proof.verify(&public, &aux_bytes(&crid.bx, sid)) {
            return Err(Error::InvalidProof);
        }

        let by = prf::eval_point::<CS>(&isk.prf, &crid.bx, uid)?;
        let sig = self.rsa.sign(&isk.rsa, &token_bytes::<CS>(&crid.com, &crid.bx, &by, ctx, sid))?;
        Ok(Token { sig, by })
    }

    /// # Description
    /// RP side: checks the commitment still opens and the token signature verifies, then unblinds `by`.
    ///
    /// # Output:
    /// ([`FinalizedToken`], [`PairwiseIdentifier`]), or [`Error::CommitmentMismatch`], [`Error::InvalidTokenSignature`].
    ///
    #[allow(clippy::too_many_arguments)]
    pub fn finalize(
        &self,
        ipk: &IssuerPublicKey,
        rid: &[u8],
        ctx: &[u8],
        sid: &[u8],
        crid: &UserCommitment,
        orid: &UserOpening,
        token: &Token,
    ) -> Result<(FinalizedToken, PairwiseIdentifier), Error> {
        let bx = self.blind_rid(&orid.b, rid)?;
        if !self.pc.open(rid, &crid.com, &orid.opening) {
            return Err(Error::CommitmentMismatch);
        }
        let tk_bytes = token_bytes::<CS>(&crid.com, &bx, &token.by, ctx, sid);
        if !self.rsa.verify(&ipk.rsa, &tk_bytes, &token.sig) {
            log::debug!("token signature rejected");
            return Err(Error::InvalidTokenSignature);
        }

        let ppid = unblind(&orid.b, &token.by)?;
        let ftk = FinalizedToken {
            com: crid.com,
            opening: orid.opening,
            b: orid.b,
            by: token.by,
            sig: token.sig.clone(),
        };
        Ok((ftk, ppid))
    }

    /// Policy check: `true` iff `ftk` certifies `ppid` for `rid` in `(ctx, sid)` under `ipk`.
    pub fn verify(
        &self,
        ipk: &IssuerPublicKey,
        rid: &[u8],
        ppid: &PairwiseIdentifier,
        ctx: &[u8],
        sid: &[u8],
        ftk: &FinalizedToken,
    ) -> bool {
        let bx = match self.blind_rid(&ftk.b, rid) {
            Ok(bx) => bx,
            Err(_) => return false,
        };
        if !self.pc.open(rid, &ftk.com, &ftk.opening) {
            return false;
        }
        let tk_bytes = token_bytes::<CS>(&ftk.com, &bx, &ftk.by, ctx, sid);
        if !self.rsa.verify(&ipk.rsa, &tk_bytes, &ftk.sig) {
            log::debug!("finalized token signature rejected");
            return false;
        }
        match unblind(&ftk.b, &ftk.by) {
            Ok(expected) => expected.0[..].ct_eq(&ppid.0[..]).into(),
            Err(_) => false,
        }
    }
}

/// `bx ‖ sid`, the context the proof is bound to.
fn aux_bytes(bx: &G1Projective, sid: &[u8]) -> Vec<u8> {
    let mut aux = Vec::with_capacity(G1_BYTES + sid.len());
    aux.extend_from_slice(&g1_to_bytes(bx));
    aux.extend_from_slice(sid);
    aux
}

/// `token_dst ‖ com ‖ bx ‖ by ‖ I2OSP(len(ctx), 8) ‖ ctx ‖ I2OSP(len(sid), 8) ‖ sid`
fn token_bytes<CS: OppidCiphersuite>(
    com: &Commitment,
    bx: &G1Projective,
    by: &G1Projective,
    ctx: &[u8],
    sid: &[u8],
) -> Vec<u8> {
    let mut bytes = CS::token_dst();
    bytes.extend_from_slice(&com.to_bytes());
    bytes.extend_from_slice(&g1_to_bytes(bx));
    bytes.extend_from_slice(&g1_to_bytes(by));
    bytes.extend_from_slice(&i2osp(ctx.len(), 8));
    bytes.extend_from_slice(ctx);
    bytes.extend_from_slice(&i2osp(sid.len(), 8));
    bytes.extend_from_slice(sid);
    bytes
}

/// `b` is drawn outside `{0, 1}` by `init`; anything else cannot come from an honest session.
fn parse_blinding(bytes: &[u8]) -> Result<Scalar, Error> {
    let b = Scalar::from_bytes_be(bytes)?;
    if b == Scalar::ZERO || b == Scalar::ONE {
        return Err(Error::DeserializationError("blinding factor must not be 0 or 1".to_owned()));
    }
    Ok(b)
}

fn unblind(b: &Scalar, by: &G1Projective) -> Result<PairwiseIdentifier, Error> {
    let b_inv = Option::<Scalar>::from(b.invert()).ok_or(Error::NotInvertible)?;
    Ok(PairwiseIdentifier(g1_to_bytes(&(by * b_inv))))
}

impl Credential {
    pub const BYTES: usize = PsSignature::BYTES;

    pub fn signature(&self) -> &PsSignature {
        &self.sig
    }

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        self.sig.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self { sig: PsSignature::from_bytes(bytes)? })
    }
}

impl UserCommitment {
    pub const BYTES: usize = 2 * G1_BYTES;

    pub fn commitment(&self) -> &Commitment {
        &self.com
    }

    /// `com ‖ bx`
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[..G1_BYTES].copy_from_slice(&self.com.to_bytes());
        bytes[G1_BYTES..].copy_from_slice(&g1_to_bytes(&self.bx));
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::BYTES {
            return Err(Error::DeserializationError("user commitment must be 96 bytes".to_owned()));
        }
        Ok(Self {
            com: Commitment::from_bytes(&bytes[..G1_BYTES])?,
            bx: parse_g1_projective(&bytes[G1_BYTES..])?,
        })
    }
}

impl UserOpening {
    pub const BYTES: usize = 2 * SCALAR_BYTES;

    /// `opening ‖ b`
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[..SCALAR_BYTES].copy_from_slice(&self.opening.to_bytes());
        bytes[SCALAR_BYTES..].copy_from_slice(&self.b.to_bytes_be());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::BYTES {
            return Err(Error::DeserializationError("user opening must be 64 bytes".to_owned()));
        }
        Ok(Self {
            opening: Opening::from_bytes(&bytes[..SCALAR_BYTES])?,
            b: parse_blinding(&bytes[SCALAR_BYTES..])?,
        })
    }
}

impl Auth {
    pub fn proof(&self) -> &ComSigProof {
        &self.proof
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.proof.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self { proof: ComSigProof::from_bytes(bytes)? })
    }
}

impl Token {
    /// `by ‖ sig`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(G1_BYTES + self.sig.as_bytes().len());
        bytes.extend_from_slice(&g1_to_bytes(&self.by));
        bytes.extend_from_slice(self.sig.as_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() <= G1_BYTES {
            return Err(Error::DeserializationError("token is too short".to_owned()));
        }
        let (by, sig) = bytes.split_at(G1_BYTES);
        Ok(Self { sig: RsaSignature::from_bytes(sig), by: parse_g1_projective(by)? })
    }
}

impl FinalizedToken {
    const FIXED_BYTES: usize = 2 * G1_BYTES + 2 * SCALAR_BYTES;

    /// `com ‖ opening ‖ b ‖ by ‖ sig`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::FIXED_BYTES + self.sig.as_bytes().len());
        bytes.extend_from_slice(&self.com.to_bytes());
        bytes.extend_from_slice(&self.opening.to_bytes());
        bytes.extend_from_slice(&self.b.to_bytes_be());
        bytes.extend_from_slice(&g1_to_bytes(&self.by));
        bytes.extend_from_slice(self.sig.as_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() <= Self::FIXED_BYTES {
            return Err(Error::DeserializationError("finalized token is too short".to_owned()));
        }
        let (com, rest) = bytes.split_at(G1_BYTES);
        let (opening, rest) = rest.split_at(SCALAR_BYTES);
        let (b, rest) = rest.split_at(SCALAR_BYTES);
        let (by, sig) = rest.split_at(G1_BYTES);
        Ok(Self {
            com: Commitment::from_bytes(com)?,
            opening: Opening::from_bytes(opening)?,
            b: parse_blinding(b)?,
            by: parse_g1_projective(by)?,
            sig: RsaSignature::from_bytes(sig),
        })
    }
}

impl PairwiseIdentifier {
    pub fn as_bytes(&self) -> &[u8; G1_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Accepts only the compressed encoding of a point of G1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let point = parse_g1_projective(bytes)?;
        Ok(Self(g1_to_bytes(&point)))
    }
}

impl Serialize for PairwiseIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PairwiseIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(encoded).map_err(D::Error::custom)?;
        Self::from_bytes(&bytes).map_err(D::Error::custom)
    }
}
