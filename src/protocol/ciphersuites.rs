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

use digest::HashMarker;
use elliptic_curve::hash2curve::{ExpandMsg, ExpandMsgXmd, ExpandMsgXof};
use sha2::Sha256;
use sha3::Shake256;

/// Hashing configuration of the protocol. Every domain-separation tag is derived from [`OppidCiphersuite::ID`],
/// so two suites never share a tag.
pub trait OppidCiphersuite: Eq + core::fmt::Debug + 'static {
    const ID: &'static [u8];
    const PROTOCOL: &'static [u8] = b"OPPID_";
    const COM_SIG: &'static [u8] = b"COM_SIG";
    const TOKEN: &'static [u8] = b"TOKEN";
    const NIZK_PC_PS: &'static [u8] = b"NIZK_PC_PS_";
    const NIZK_PC: &'static [u8] = b"NIZK_PC";
    const NIZK_PS: &'static [u8] = b"NIZK_PS";
    const PRF_FK: &'static [u8] = b"FK_";
    const PRF_DL: &'static [u8] = b"DL_PRF";
    const COMMITMENT: &'static [u8] = b"COM_PC_";
    const SIGNATURE: &'static [u8] = b"PS_";
    type HashAlg: HashMarker;
    type Expander: for<'a> ExpandMsg<'a>;

    /// Tag of the orchestrator, used to hash the registrant identifier to G1 before blinding.
    fn protocol_dst() -> Vec<u8> {
        [Self::ID, Self::PROTOCOL].concat()
    }

    /// The single tag shared by the commitment and the signature scheme.
    fn com_sig_dst() -> Vec<u8> {
        [Self::ID, Self::PROTOCOL, Self::COM_SIG].concat()
    }

    fn token_dst() -> Vec<u8> {
        [Self::ID, Self::PROTOCOL, Self::TOKEN].concat()
    }

    fn nizk_com_sig_dst() -> Vec<u8> {
        [Self::ID, Self::NIZK_PC_PS].concat()
    }

    fn nizk_commitment_dst() -> Vec<u8> {
        [Self::ID, Self::NIZK_PC, b"Z"].concat()
    }

    fn nizk_signature_dst() -> Vec<u8> {
        [Self::ID, Self::NIZK_PS].concat()
    }

    fn prf_fk_dst() -> Vec<u8> {
        [Self::ID, Self::PRF_FK].concat()
    }

    fn prf_dl_dst() -> Vec<u8> {
        [Self::ID, Self::PRF_DL].concat()
    }

    fn commitment_dst() -> Vec<u8> {
        [Self::ID, Self::COMMITMENT].concat()
    }

    fn signature_dst() -> Vec<u8> {
        [Self::ID, Self::SIGNATURE].concat()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bls12381Sha256;
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bls12381Shake256;

impl OppidCiphersuite for Bls12381Sha256 {
    // kept byte-identical to the tags of the deployed protocol, including the curve label
    const ID: &'static [u8] = b"OPPID_BLS12384_XMD:SHA-256_";
    type HashAlg = Sha256;
    type Expander = ExpandMsgXmd<Self::HashAlg>;
}

impl OppidCiphersuite for Bls12381Shake256 {
    const ID: &'static [u8] = b"OPPID_BLS12381_XOF:SHAKE-256_";
    type HashAlg = Shake256;
    type Expander = ExpandMsgXof<Self::HashAlg>;
}

#[cfg(test)]
mod tests {
    use super::{Bls12381Sha256, Bls12381Shake256, OppidCiphersuite};

    #[test]
    fn sha256_tags() {
        assert_eq!(Bls12381Sha256::protocol_dst(), b"OPPID_BLS12384_XMD:SHA-256_OPPID_".to_vec());
        assert_eq!(Bls12381Sha256::com_sig_dst(), b"OPPID_BLS12384_XMD:SHA-256_OPPID_COM_SIG".to_vec());
        assert_eq!(Bls12381Sha256::nizk_com_sig_dst(), b"OPPID_BLS12384_XMD:SHA-256_NIZK_PC_PS_".to_vec());
        assert_eq!(Bls12381Sha256::prf_fk_dst(), b"OPPID_BLS12384_XMD:SHA-256_FK_".to_vec());
        assert_eq!(Bls12381Sha256::prf_dl_dst(), b"OPPID_BLS12384_XMD:SHA-256_DL_PRF".to_vec());
    }

    #[test]
    fn suites_do_not_share_tags() {
        assert_ne!(Bls12381Sha256::com_sig_dst(), Bls12381Shake256::com_sig_dst());
        assert_ne!(Bls12381Sha256::protocol_dst(), Bls12381Sha256::com_sig_dst());
    }
}
