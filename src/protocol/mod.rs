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

//! OPPID (Oblivious Pairwise Pseudonymous Identifiers) lets an identity provider derive a per-RP pseudonym
//! for a user without learning which relying party asked for it.
//! - **Obliviousness**: the relying party only shows the IdP a Pedersen commitment to its identifier, a blinded hash
//!                      of it, and a zero-knowledge proof that it holds a PS credential on the committed identifier.
//! - **Pairwise pseudonyms**: the IdP evaluates a composed PRF on the blinded point and the user identifier; the
//!                            relying party unblinds the result, obtaining the same pseudonym in every session.
//! - **Replay binding**: proofs are bound to the session id and tokens are RSA-signed over the session id and context.
//!
//! # Usage
//! ```no_run
//! use oppid::protocol::ciphersuites::Bls12381Sha256;
//! use oppid::protocol::session::PublicParameters;
//!
//! let mut rng = rand::thread_rng();
//! let pp = PublicParameters::<Bls12381Sha256>::setup(None, &mut rng).unwrap();
//! let keypair = pp.key_gen(&mut rng).unwrap();
//! let (isk, ipk) = (keypair.private_key(), keypair.public_key());
//!
//! let cred = pp.register(isk, b"rp-id", &mut rng).unwrap();
//! let (orid, crid) = pp.init(b"rp-id", &mut rng).unwrap();
//! let auth = pp.request(ipk, b"rp-id", &cred, &crid, &orid, b"sid", &mut rng).unwrap();
//! let token = pp.response(isk, &auth, &crid, b"user", b"ctx", b"sid").unwrap();
//! let (ftk, ppid) = pp.finalize(ipk, b"rp-id", b"ctx", b"sid", &crid, &orid, &token).unwrap();
//! assert!(pp.verify(ipk, b"rp-id", &ppid, b"ctx", b"sid", &ftk));
//! ```

/// Module for ciphersuites
pub mod ciphersuites;
/// Module for Pedersen commitments
pub mod commitment;
/// Module for issuer keys
pub mod keys;
/// Module for the composed PRF
pub mod prf;
/// Module for the combined commitment/signature proof
pub mod proof;
/// Module for RSA token signatures
pub mod rsa;
/// Module for the protocol phases
pub mod session;
/// Module for PS signatures
pub mod signature;
