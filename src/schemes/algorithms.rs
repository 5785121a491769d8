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

use core::fmt::Debug;
use core::marker::PhantomData;

use crate::keys::traits::PublicKey;
use crate::protocol::ciphersuites::{Bls12381Sha256, Bls12381Shake256, OppidCiphersuite};
use crate::protocol::keys::{IssuerPublicKey, IssuerSecretKey};

pub trait Scheme: Eq + Debug + 'static + Sized {
    type Ciphersuite: OppidCiphersuite;
    type PrivKey: Debug;
    type PubKey: PublicKey + Debug;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Oppid<CS: OppidCiphersuite>(PhantomData<CS>);

impl<CS: OppidCiphersuite> Scheme for Oppid<CS> {
    type Ciphersuite = CS;
    type PrivKey = IssuerSecretKey;
    type PubKey = IssuerPublicKey;
}

pub type OppidBls12381Sha256 = Oppid<Bls12381Sha256>;
pub type OppidBls12381Shake256 = Oppid<Bls12381Shake256>;
