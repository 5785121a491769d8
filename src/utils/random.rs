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

use bls12_381_plus::Scalar;
use ff::Field;
use rand::{CryptoRng, RngCore};

use crate::errors::Error;

/// Upper bound on resampling when a freshly drawn scalar hits a degenerate value.
pub const MAX_SAMPLING_ATTEMPTS: usize = 4;

pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    Scalar::random(&mut *rng)
}

/// Samples a scalar different from zero.
pub fn random_nonzero_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Scalar, Error> {
    sample_scalar_where(rng, |s| *s != Scalar::ZERO)
}

/// Samples a scalar different from zero and one, as needed for a blinding factor.
pub fn random_scalar_not_one<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Scalar, Error> {
    sample_scalar_where(rng, |s| *s != Scalar::ZERO && *s != Scalar::ONE)
}

fn sample_scalar_where<R, F>(rng: &mut R, accept: F) -> Result<Scalar, Error>
where
    R: RngCore + CryptoRng,
    F: Fn(&Scalar) -> bool,
{
    for attempt in 0..MAX_SAMPLING_ATTEMPTS {
        let candidate = random_scalar(rng);
        if accept(&candidate) {
            return Ok(candidate);
        }
        log::warn!("rejected degenerate scalar, resampling (attempt {})", attempt + 1);
    }
    Err(Error::SamplingExhausted(MAX_SAMPLING_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Always yields the all-zero byte stream, so every sampled scalar is zero.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    #[test]
    fn nonzero_scalar_is_nonzero() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let s = random_nonzero_scalar(&mut rng).unwrap();
            assert_ne!(s, Scalar::ZERO);
        }
    }

    #[test]
    fn blinding_scalar_is_neither_zero_nor_one() {
        let mut rng = StdRng::seed_from_u64(11);
        let s = random_scalar_not_one(&mut rng).unwrap();
        assert_ne!(s, Scalar::ZERO);
        assert_ne!(s, Scalar::ONE);
    }

    #[test]
    fn degenerate_rng_exhausts_retries() {
        assert_eq!(
            random_nonzero_scalar(&mut ZeroRng),
            Err(Error::SamplingExhausted(MAX_SAMPLING_ATTEMPTS))
        );
    }
}
