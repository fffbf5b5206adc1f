//! Call descriptors and the caller-owned sequence they are appended to.
//!
//! A sequence is plain data: each appended call gets a `Result(i)` handle that
//! later calls can take as an argument. The canonical CBOR form is what the
//! plan store hashes, so two identical sequences share one digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smallvec::SmallVec;

use crate::address::{Address, encode_hex};
use crate::encode::EncodedValue;
use crate::error::{Result, StageError};

/// One positional argument of a call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallArg {
    /// Value returned by an earlier call in the same sequence.
    Result(u16),
    /// One element of a tuple returned by an earlier call.
    NestedResult(u16, u16),
    /// Shared or owned on-ledger object.
    Object(Address),
    /// Canonically encoded value.
    Pure(EncodedValue),
}

/// Fully resolved call ready for submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    pub target: String,
    pub type_arguments: SmallVec<[String; 2]>,
    pub arguments: Vec<CallArg>,
}

impl CallDescriptor {
    /// Split `target` into `(address, module, function)`.
    pub fn target_parts(&self) -> Option<(&str, &str, &str)> {
        let mut parts = self.target.splitn(3, "::");
        let address = parts.next().filter(|s| !s.is_empty())?;
        let module = parts.next().filter(|s| !s.is_empty())?;
        let function = parts.next().filter(|s| !s.is_empty() && !s.contains("::"))?;
        Some((address, module, function))
    }
}

/// In-progress chain of calls owned by the calling workflow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSequence {
    calls: Vec<CallDescriptor>,
}

impl CallSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call and return the handle to its result.
    pub fn push(&mut self, call: CallDescriptor) -> Result<CallArg> {
        let index = u16::try_from(self.calls.len()).map_err(|_| StageError::SequenceFull)?;
        self.calls.push(call);
        Ok(CallArg::Result(index))
    }

    /// Append several calls, all or none.
    pub fn extend(&mut self, calls: Vec<CallDescriptor>) -> Result<Vec<CallArg>> {
        if self.calls.len() + calls.len() > usize::from(u16::MAX) + 1 {
            return Err(StageError::SequenceFull);
        }
        let mut handles = Vec::with_capacity(calls.len());
        for call in calls {
            handles.push(self.push(call)?);
        }
        Ok(handles)
    }

    pub fn calls(&self) -> &[CallDescriptor] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Canonical CBOR encoding of the sequence.
    pub fn encode_cbor(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn decode_cbor(bytes: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    /// SHA-256 over the canonical CBOR encoding.
    pub fn digest(&self) -> Result<[u8; 32]> {
        let cbor = self.encode_cbor()?;
        Ok(digest_bytes(&cbor))
    }

    pub fn digest_hex(&self) -> Result<String> {
        Ok(encode_hex(&self.digest()?))
    }
}

pub(crate) fn digest_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}
