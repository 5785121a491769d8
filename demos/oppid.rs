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

mod oppid_example {
    use oppid::{
        errors::Error,
        keys::traits::PublicKey,
        protocol::{ciphersuites::OppidCiphersuite, session::PublicParameters},
    };

    const RID: &[u8] = b"https://rp.example.org";
    const UID: &[u8] = b"alice.doe@idp.com";
    const CTX: &[u8] = b"openid profile";

    pub(crate) fn oppid_main<CS: OppidCiphersuite>(rsa_bits: Option<usize>) -> Result<(), Error> {
        let mut rng = rand::thread_rng();

        log::info!("Setup...");
        let pp = PublicParameters::<CS>::setup(rsa_bits, &mut rng)?;
        log::info!("Shared commitment/signature tag: {}", String::from_utf8_lossy(pp.dst()));

        log::info!("IdP Keypair Generation...");
        let keypair = pp.key_gen(&mut rng)?;
        let (isk, ipk) = (keypair.private_key(), keypair.public_key());
        log::info!("IdP PK: {}", ipk.encode());

        log::info!("RP Registration...");
        let cred = pp.register(isk, RID, &mut rng)?;
        log::info!("Credential: {}", hex::encode(cred.to_bytes()));

        for session in 1..=2 {
            let sid = format!("session-{session}");
            log::info!("[{sid}] Init...");
            let (orid, crid) = pp.init(RID, &mut rng)?;
            log::info!("[{sid}] Commitment: {}", hex::encode(crid.to_bytes()));

            log::info!("[{sid}] Request (commitment + signature proof)...");
            let auth = pp.request(ipk, RID, &cred, &crid, &orid, sid.as_bytes(), &mut rng)?;
            log::info!("[{sid}] Proof: {} bytes", auth.to_bytes().len());

            log::info!("[{sid}] Response...");
            let token = pp.response(isk, &auth, &crid, UID, CTX, sid.as_bytes())?;

            log::info!("[{sid}] Finalize...");
            let (ftk, ppid) = pp.finalize(ipk, RID, CTX, sid.as_bytes(), &crid, &orid, &token)?;
            log::info!("[{sid}] PPID: {}", ppid.to_hex());

            let valid = pp.verify(ipk, RID, &ppid, CTX, sid.as_bytes(), &ftk);
            assert!(valid, "Finalized token verification FAILED!");
            log::info!("[{sid}] Finalized token is VALID");
        }

        Ok(())
    }
}

fn main() {
    use crate::oppid_example::oppid_main;
    use oppid::protocol::ciphersuites::{Bls12381Sha256, Bls12381Shake256};
    use std::env;

    dotenvy::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        println!(
            "Usage: {} <cipher_suite>
                Ciphersuites:
                    - BLS12-381-SHA-256
                    - BLS12-381-SHAKE-256",
            args[0]
        );
        return;
    }

    let rsa_bits = env::var("OPPID_RSA_BITS").ok().and_then(|bits| bits.parse::<usize>().ok());

    let cipher_suite = &args[1];

    let result = match cipher_suite.as_str() {
        "BLS12-381-SHA-256" => {
            log::info!("Ciphersuite: BLS12-381-SHA-256");
            oppid_main::<Bls12381Sha256>(rsa_bits)
        }
        "BLS12-381-SHAKE-256" => {
            log::info!("Ciphersuite: BLS12-381-SHAKE-256");
            oppid_main::<Bls12381Shake256>(rsa_bits)
        }
        _ => {
            println!("Unknown cipher suite: {}", cipher_suite);
            return;
        }
    };

    if let Err(e) = result {
        log::error!("{e}");
    }
}
