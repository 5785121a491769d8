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

pub mod oppid_utils {
    use bls12_381_plus::{G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar};
    use elliptic_curve::group::Curve;
    use elliptic_curve::hash2curve::{ExpandMsg, Expander};

    use crate::errors::Error;
    use crate::protocol::ciphersuites::OppidCiphersuite;

    /// Length of the uniform string fed to `Scalar::from_okm` (L in RFC 9380 hash_to_field).
    pub const EXPAND_LEN: usize = 48;
    pub const SCALAR_BYTES: usize = 32;
    pub const G1_BYTES: usize = 48;
    pub const G2_BYTES: usize = 96;
    pub const GT_BYTES: usize = 576;

    /// https://www.rfc-editor.org/rfc/rfc9380#name-hashing-to-a-finite-field
    ///
    /// # Description
    /// Maps an arbitrary octet string to a scalar of the BLS12-381 group order, using the expander of the ciphersuite.
    ///
    /// # Inputs:
    /// * `msg` (REQUIRED), octet string to hash.
    /// * `dst` (REQUIRED), domain-separation tag. Must be non-empty.
    ///
    /// # Output:
    /// a [`Scalar`] or [`Error::HashToScalarError`].
    ///
    pub fn hash_to_scalar<CS: OppidCiphersuite>(msg: &[u8], dst: &[u8]) -> Result<Scalar, Error> {
        if dst.is_empty() {
            return Err(Error::HashToScalarError);
        }
        let mut uniform_bytes = [0u8; EXPAND_LEN];
        CS::Expander::expand_message(&[msg], &[dst], EXPAND_LEN)
            .map_err(|_| Error::HashToScalarError)?
            .fill_bytes(&mut uniform_bytes);
        Ok(Scalar::from_okm(&uniform_bytes))
    }

    /// hash_to_curve with the SSWU random-oracle encoding onto G1.
    pub fn hash_to_curve<CS: OppidCiphersuite>(msg: &[u8], dst: &[u8]) -> Result<G1Projective, Error> {
        if dst.is_empty() {
            return Err(Error::HashToCurveError);
        }
        Ok(G1Projective::hash::<CS::Expander>(msg, dst))
    }

    pub fn g1_to_bytes(p: &G1Projective) -> [u8; G1_BYTES] {
        p.to_affine().to_compressed()
    }

    pub fn g2_to_bytes(p: &G2Projective) -> [u8; G2_BYTES] {
        p.to_affine().to_compressed()
    }

    pub fn parse_g1_projective(bytes: &[u8]) -> Result<G1Projective, Error> {
        let bytes: [u8; G1_BYTES] = bytes
            .try_into()
            .map_err(|_| Error::DeserializationError("G1 point must be 48 bytes".to_owned()))?;
        Option::<G1Affine>::from(G1Affine::from_compressed(&bytes))
            .map(G1Projective::from)
            .ok_or_else(|| Error::DeserializationError("invalid G1 point".to_owned()))
    }

    pub fn parse_g2_projective(bytes: &[u8]) -> Result<G2Projective, Error> {
        let bytes: [u8; G2_BYTES] = bytes
            .try_into()
            .map_err(|_| Error::DeserializationError("G2 point must be 96 bytes".to_owned()))?;
        Option::<G2Affine>::from(G2Affine::from_compressed(&bytes))
            .map(G2Projective::from)
            .ok_or_else(|| Error::DeserializationError("invalid G2 point".to_owned()))
    }

    pub fn parse_gt(bytes: &[u8]) -> Result<Gt, Error> {
        let bytes: [u8; GT_BYTES] = bytes
            .try_into()
            .map_err(|_| Error::DeserializationError("GT element must be 576 bytes".to_owned()))?;
        Option::<Gt>::from(Gt::from_bytes(&bytes))
            .ok_or_else(|| Error::DeserializationError("invalid GT element".to_owned()))
    }

    /// Integer to Octet Stream, big-endian, `len` bytes.
    pub fn i2osp(value: usize, len: usize) -> Vec<u8> {
        let bytes = (value as u64).to_be_bytes();
        if len >= bytes.len() {
            [vec![0u8; len - bytes.len()], bytes.to_vec()].concat()
        } else {
            bytes[bytes.len() - len..].to_vec()
        }
    }

    pub trait ScalarExt: Sized {
        fn to_bytes_be(&self) -> [u8; SCALAR_BYTES];
        fn from_bytes_be(bytes: &[u8]) -> Result<Self, Error>;
    }

    impl ScalarExt for Scalar {
        fn to_bytes_be(&self) -> [u8; SCALAR_BYTES] {
            self.to_be_bytes()
        }

        fn from_bytes_be(bytes: &[u8]) -> Result<Self, Error> {
            let bytes: [u8; SCALAR_BYTES] = bytes
                .try_into()
                .map_err(|_| Error::DeserializationError("scalar must be 32 bytes".to_owned()))?;
            Option::<Scalar>::from(Scalar::from_be_bytes(&bytes))
                .ok_or_else(|| Error::DeserializationError("scalar not in field".to_owned()))
        }
    }

}
