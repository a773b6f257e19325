//! Request fingerprints.
//!
//! A fingerprint names the output of a request. Identical requests over
//! unchanged inputs share a fingerprint; anything else gets a different one,
//! so different requests never share an output path.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::encoding::EncodingConfig;
use crate::request::OverlayRequest;
use crate::semantics::ResolveSemantics;

/// Number of hex characters kept in output filenames.
pub const FINGERPRINT_LEN: usize = 16;

/// Size and modification time of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub struct InputStamp {
    pub len: u64,
    pub modified_secs: u64,
    pub modified_nanos: u32,
}

#[derive(Serialize)]
struct FingerprintSource<'a> {
    request: &'a OverlayRequest,
    semantics: &'a ResolveSemantics,
    encoding: &'a EncodingConfig,
    inputs: &'a [InputStamp],
}

/// SHA-256 digest of a request and everything that shapes its output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    pub fn compute(
        request: &OverlayRequest,
        semantics: &ResolveSemantics,
        encoding: &EncodingConfig,
        inputs: &[InputStamp],
    ) -> Result<Self, serde_json::Error> {
        let source = FingerprintSource {
            request,
            semantics,
            encoding,
            inputs,
        };
        let bytes = serde_json::to_vec(&source)?;
        let digest = Sha256::digest(&bytes);
        let hex = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Ok(Self(hex))
    }

    /// Full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened digest used in filenames.
    pub fn short(&self) -> &str {
        &self.0[..FINGERPRINT_LEN.min(self.0.len())]
    }

    /// `<prefix>_<short digest>`
    pub fn file_stem(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.short())
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}
