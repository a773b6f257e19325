//! Shared data models for picture-in-picture overlay composition.
//!
//! This crate provides Serde-serializable types for:
//! - Probed media information
//! - Overlay requests (position, size, time window, audio routing)
//! - Resolution semantics and resolved overlay parameters
//! - Encoding configuration
//! - Request fingerprints used for output naming

pub mod encoding;
pub mod error;
pub mod fingerprint;
pub mod media;
pub mod position;
pub mod request;
pub mod resolved;
pub mod semantics;

// Re-export common types
pub use encoding::EncodingConfig;
pub use error::ModelError;
pub use fingerprint::{InputStamp, RequestFingerprint};
pub use media::MediaInfo;
pub use position::{Anchor, OverlayPosition};
pub use request::{AudioOption, OverlayRequest, OverlaySize};
pub use resolved::{FrameSize, PixelPosition, ResolvedOverlay};
pub use semantics::{EndTimeMode, ResolveSemantics, SizeMode};
