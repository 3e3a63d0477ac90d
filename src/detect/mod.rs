pub mod catalogue;
pub mod engine;
pub mod jwt;
pub mod pair;
pub mod private_key;
pub mod simple;

pub use engine::{DetectionEngine, EngineError};
pub use jwt::JwtDetector;
pub use pair::PairDetector;
pub use private_key::PrivateKeyDetector;
pub use simple::SimpleTokenDetector;

use crate::secret::Secret;

/// A window-relative hit produced by a detector. The engine translates the
/// offset into an absolute stream position.
#[derive(Debug)]
pub struct RawFinding {
    pub secret: Secret,
    pub offset: usize,
}

/// A detection unit: given a byte window, return every typed secret it
/// contains together with window-relative offsets, in order of occurrence.
///
/// Detectors must be pure — no shared mutable state — so one instance can be
/// used by concurrent scans. Internal predicate failures (a match that fails
/// structural validation) are silent skips, never errors.
pub trait Detector: Send + Sync {
    /// Family label used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Longest secret this detector can emit, in bytes. The engine sizes its
    /// window overlap from the maximum across registered detectors so that
    /// any secret is wholly visible in at least one window.
    fn max_len(&self) -> usize;

    /// Literal byte prefixes for the engine's Aho-Corasick prefilter. An
    /// empty slice means no usable prefix exists and the detector runs on
    /// every window.
    fn prefixes(&self) -> &[&'static [u8]];

    fn detect(&self, window: &[u8]) -> Vec<RawFinding>;
}
