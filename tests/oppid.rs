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

mod oppid_tests {
    use std::sync::OnceLock;

    use oppid::errors::{Error, ErrorKind};
    use oppid::keys::pair::KeyPair;
    use oppid::protocol::ciphersuites::{Bls12381Sha256, Bls12381Shake256, OppidCiphersuite};
    use oppid::protocol::rsa::MIN_MODULUS_BITS;
    use oppid::protocol::session::{FinalizedToken, PairwiseIdentifier, PublicParameters};
    use oppid::schemes::algorithms::Oppid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const RID: &[u8] = b"Test-RID";
    const UID: &[u8] = b"alice.doe@idp.com";
    const CTX: &[u8] = b"Test-CTX";
    const SID: &[u8] = b"Test-SID";

    type Setup<CS> = (PublicParameters<CS>, KeyPair<Oppid<CS>>);

    trait Fixture: OppidCiphersuite + Sized {
        fn fixture() -> &'static Setup<Self>;
    }

    fn build<CS: OppidCiphersuite>(seed: u64) -> Setup<CS> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = StdRng::seed_from_u64(seed);
        let pp = PublicParameters::<CS>::setup(Some(MIN_MODULUS_BITS), &mut rng).unwrap();
        let keypair = pp.key_gen(&mut rng).unwrap();
        (pp, keypair)
    }

    impl Fixture for Bls12381Sha256 {
        fn fixture() -> &'static Setup<Self> {
            static SETUP: OnceLock<Setup<Bls12381Sha256>> = OnceLock::new();
            SETUP.get_or_init(|| build(1))
        }
    }

    impl Fixture for Bls12381Shake256 {
        fn fixture() -> &'static Setup<Self> {
            static SETUP: OnceLock<Setup<Bls12381Shake256>> = OnceLock::new();
            SETUP.get_or_init(|| build(2))
        }
    }

    /// Runs every phase for one session and returns what the RP keeps at the end.
    fn run_session<CS: Fixture>(
        rid: &[u8],
        uid: &[u8],
        ctx: &[u8],
        sid: &[u8],
        rng: &mut StdRng,
    ) -> Result<(FinalizedToken, PairwiseIdentifier), Error> {
        let (pp, keypair) = CS::fixture();
        let (isk, ipk) = (keypair.private_key(), keypair.public_key());

        let cred = pp.register(isk, rid, rng)?;
        let (orid, crid) = pp.init(rid, rng)?;
        let auth = pp.request(ipk, rid, &cred, &crid, &orid, sid, rng)?;
        let token = pp.response(isk, &auth, &crid, uid, ctx, sid)?;
        pp.finalize(ipk, rid, ctx, sid, &crid, &orid, &token)
    }

    macro_rules! oppid_tests {
        ( $( $t:ident: { $( $n:ident => $f:ident, )+ }, )+ ) => { $($(
            #[test] fn $n() { $f::<$t>(); }
        )+)+ }
    }

    oppid_tests! {
        Bls12381Sha256: {
            end_to_end_sha256 => end_to_end,
            pseudonym_is_stable_across_sessions_sha256 => pseudonym_is_stable_across_sessions,
            pseudonym_is_pairwise_sha256 => pseudonym_is_pairwise,
            token_is_bound_to_context_and_session_sha256 => token_is_bound_to_context_and_session,
            tampered_signature_fails_sha256 => tampered_signature_fails,
            foreign_issuer_is_rejected_sha256 => foreign_issuer_is_rejected,
        },
        Bls12381Shake256: {
            end_to_end_shake256 => end_to_end,
            pseudonym_is_stable_across_sessions_shake256 => pseudonym_is_stable_across_sessions,
            pseudonym_is_pairwise_shake256 => pseudonym_is_pairwise,
            token_is_bound_to_context_and_session_shake256 => token_is_bound_to_context_and_session,
            tampered_signature_fails_shake256 => tampered_signature_fails,
            foreign_issuer_is_rejected_shake256 => foreign_issuer_is_rejected,
        },
    }

    fn end_to_end<CS: Fixture>() {
        let (pp, keypair) = CS::fixture();
        let mut rng = StdRng::seed_from_u64(10);
        let (ftk, ppid) = run_session::<CS>(RID, UID, CTX, SID, &mut rng).unwrap();
        assert!(pp.verify(keypair.public_key(), RID, &ppid, CTX, SID, &ftk));
    }

    fn pseudonym_is_stable_across_sessions<CS: Fixture>() {
        let (pp, keypair) = CS::fixture();
        let (isk, ipk) = (keypair.private_key(), keypair.public_key());
        let mut rng = StdRng::seed_from_u64(11);
        let cred = pp.register(isk, RID, &mut rng).unwrap();

        let mut ppids = Vec::new();
        let mut blinded = Vec::new();
        for sid in [b"sid-1".as_slice(), b"sid-2".as_slice()] {
            let (orid, crid) = pp.init(RID, &mut rng).unwrap();
            let auth = pp.request(ipk, RID, &cred, &crid, &orid, sid, &mut rng).unwrap();
            let token = pp.response(isk, &auth, &crid, UID, CTX, sid).unwrap();
            let (ftk, ppid) = pp.finalize(ipk, RID, CTX, sid, &crid, &orid, &token).unwrap();
            assert!(pp.verify(ipk, RID, &ppid, CTX, sid, &ftk));
            blinded.push(crid.to_bytes());
            ppids.push(ppid);
        }

        // what the IdP sees differs, the pseudonym does not
        assert_ne!(blinded[0][48..], blinded[1][48..]);
        assert_eq!(ppids[0], ppids[1]);
    }

    fn pseudonym_is_pairwise<CS: Fixture>() {
        let mut rng = StdRng::seed_from_u64(12);
        let (_, base) = run_session::<CS>(RID, UID, CTX, SID, &mut rng).unwrap();
        let (_, other_rp) = run_session::<CS>(b"Other-RID", UID, CTX, SID, &mut rng).unwrap();
        let (_, other_user) = run_session::<CS>(RID, b"bob@idp.com", CTX, SID, &mut rng).unwrap();

        assert_ne!(base, other_rp);
        assert_ne!(base, other_user);
        assert_ne!(other_rp, other_user);
    }

    fn token_is_bound_to_context_and_session<CS: Fixture>() {
        let (pp, keypair) = CS::fixture();
        let ipk = keypair.public_key();
        let mut rng = StdRng::seed_from_u64(13);
        let (ftk, ppid) = run_session::<CS>(RID, UID, CTX, SID, &mut rng).unwrap();

        assert!(pp.verify(ipk, RID, &ppid, CTX, SID, &ftk));
        assert!(!pp.verify(ipk, RID, &ppid, b"Other-CTX", SID, &ftk));
        assert!(!pp.verify(ipk, RID, &ppid, CTX, b"Other-SID", &ftk));
        // moving bytes between ctx and sid does not help
        assert!(!pp.verify(ipk, RID, &ppid, b"Test-CTXTest", b"-SID", &ftk));
        assert!(!pp.verify(ipk, b"Other-RID", &ppid, CTX, SID, &ftk));

        let (_, other_ppid) = run_session::<CS>(RID, b"bob@idp.com", CTX, SID, &mut rng).unwrap();
        assert!(!pp.verify(ipk, RID, &other_ppid, CTX, SID, &ftk));
    }

    fn tampered_signature_fails<CS: Fixture>() {
        let (pp, keypair) = CS::fixture();
        let ipk = keypair.public_key();
        let mut rng = StdRng::seed_from_u64(14);
        let (ftk, ppid) = run_session::<CS>(RID, UID, CTX, SID, &mut rng).unwrap();

        // the RSA signature is the trailing field of the encoding
        let mut bytes = ftk.to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = FinalizedToken::from_bytes(&bytes).unwrap();

        assert!(pp.verify(ipk, RID, &ppid, CTX, SID, &ftk));
        assert!(!pp.verify(ipk, RID, &ppid, CTX, SID, &tampered));
    }

    fn foreign_issuer_is_rejected<CS: Fixture>() {
        let (pp, keypair) = CS::fixture();
        let (isk, ipk) = (keypair.private_key(), keypair.public_key());
        let mut rng = StdRng::seed_from_u64(15);

        let other = pp.key_gen(&mut rng).unwrap();
        let cred = pp.register(isk, RID, &mut rng).unwrap();
        let (orid, crid) = pp.init(RID, &mut rng).unwrap();

        // credential issued by someone else
        let err = pp.request(other.public_key(), RID, &cred, &crid, &orid, SID, &mut rng).unwrap_err();
        assert_eq!(err, Error::InvalidCredential);

        // proof checked by an IdP whose key did not sign the credential
        let auth = pp.request(ipk, RID, &cred, &crid, &orid, SID, &mut rng).unwrap();
        let err = pp.response(other.private_key(), &auth, &crid, UID, CTX, SID).unwrap_err();
        assert_eq!(err, Error::InvalidProof);
        assert_eq!(err.kind(), ErrorKind::ProtocolViolation);

        // token signed by the right IdP, checked against another one
        let token = pp.response(isk, &auth, &crid, UID, CTX, SID).unwrap();
        let err = pp.finalize(other.public_key(), RID, CTX, SID, &crid, &orid, &token).unwrap_err();
        assert_eq!(err, Error::InvalidTokenSignature);
    }

    #[test]
    fn weak_rsa_modulus_is_rejected() {
        let mut rng = StdRng::seed_from_u64(16);
        let err = PublicParameters::<Bls12381Sha256>::setup(Some(768), &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Setup);
    }

    #[test]
    fn ppid_serializes_as_hex() {
        let mut rng = StdRng::seed_from_u64(17);
        let (ftk, ppid) = run_session::<Bls12381Sha256>(RID, UID, CTX, SID, &mut rng).unwrap();

        let json = serde_json::to_string(&ppid).unwrap();
        assert_eq!(json, format!("\"{}\"", ppid.to_hex()));
        assert_eq!(serde_json::from_str::<PairwiseIdentifier>(&json).unwrap(), ppid);

        let json = serde_json::to_string(&ftk).unwrap();
        let restored: FinalizedToken = serde_json::from_str(&json).unwrap();
        let (pp, keypair) = Bls12381Sha256::fixture();
        assert!(pp.verify(keypair.public_key(), RID, &ppid, CTX, SID, &restored));
    }
}
