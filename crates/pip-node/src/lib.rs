//! Picture-in-picture overlay node.
//!
//! Wires configuration, the FFmpeg-backed pipeline and the host-facing
//! operations together.

pub mod config;
pub mod error;
pub mod node;

pub use config::NodeConfig;
pub use error::{NodeError, NodeResult};
pub use node::{parse_annotated, MediaDir, OverlayInputs, PipNode};
