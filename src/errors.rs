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

use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Error during keypair generation: {0}")]
    KeyGenError(String),
    #[error("Invalid public parameters: {0}")]
    InvalidParameters(String),
    #[error("Random sampling did not produce a valid scalar after {0} attempts")]
    SamplingExhausted(usize),
    #[error("Error during hash to scalar computation")]
    HashToScalarError,
    #[error("Error during hash to curve computation")]
    HashToCurveError,
    #[error("Error during computation of a Signature: {0}")]
    SignatureGenerationError(String),
    #[error("Error during computation of a Proof: {0}")]
    ProofGenError(String),
    #[error("Error during deserialization: {0}")]
    DeserializationError(String),

    #[error("Blinded registrant identifier does not match the blinding factor")]
    BlindingMismatch,
    #[error("Commitment does not open to the registrant identifier")]
    CommitmentMismatch,
    #[error("Credential is not a valid signature on the registrant identifier")]
    InvalidCredential,
    #[error("Invalid commitment/signature proof")]
    InvalidProof,
    #[error("Invalid token signature")]
    InvalidTokenSignature,

    #[error("Scalar is not invertible")]
    NotInvertible,
}

/// Coarse classification of an [`Error`], used by callers to decide how to react.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Raised once while building parameters or keys (RNG failure, malformed parameters).
    Setup,
    /// A counterparty sent something inconsistent; the session has to be aborted.
    ProtocolViolation,
    /// Bytes that do not decode to a valid value.
    Malformed,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::KeyGenError(_)
            | Error::InvalidParameters(_)
            | Error::SamplingExhausted(_)
            | Error::HashToScalarError
            | Error::HashToCurveError
            | Error::SignatureGenerationError(_)
            | Error::ProofGenError(_) => ErrorKind::Setup,
            Error::BlindingMismatch
            | Error::CommitmentMismatch
            | Error::InvalidCredential
            | Error::InvalidProof
            | Error::InvalidTokenSignature => ErrorKind::ProtocolViolation,
            Error::DeserializationError(_) | Error::NotInvertible => ErrorKind::Malformed,
        }
    }

    pub fn is_protocol_violation(&self) -> bool {
        self.kind() == ErrorKind::ProtocolViolation
    }
}
