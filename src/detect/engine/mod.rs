use aho_corasick::AhoCorasick;
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::detect::Detector;
use crate::secret::{Finding, Secret};

/// Base window on top of which the detector overlap is added.
const BASE_WINDOW: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("stream read failed")]
    Io(#[from] std::io::Error),
    #[error("scan cancelled")]
    Cancelled,
}

/// Streams a reader through every registered detector.
///
/// The stream is consumed in overlapping windows: the tail `overlap` bytes
/// (the maximum `max_len` across detectors) of each window are re-shown at
/// the head of the next, so any secret no longer than `overlap` is wholly
/// visible in at least one window. Findings that start inside the re-shown
/// tail are deferred to the next window, which is what keeps the overlap
/// from duplicating hits.
///
/// Per window the engine runs a single Aho-Corasick pass over the bytes to
/// decide which detectors' literal prefixes are present; only those
/// detectors (plus prefix-less ones) run their full detection.
///
/// The engine owns no global state and is single-threaded per call; one
/// engine may serve concurrent scans since detectors are pure and the
/// compiled automaton is read-only.
pub struct DetectionEngine {
    detectors: Vec<Arc<dyn Detector>>,
    ac: AhoCorasick,
    /// AC pattern index -> detector index.
    ac_owner: Vec<usize>,
    /// Detectors with no usable prefix run on every window.
    always_run: Vec<bool>,
    overlap: usize,
    window: usize,
}

impl DetectionEngine {
    /// Build an engine from an ordered detector list. Registration order is
    /// the tie-break for findings at equal offsets.
    pub fn new(detectors: Vec<Arc<dyn Detector>>) -> Result<Self> {
        Self::with_base_window(detectors, BASE_WINDOW)
    }

    /// As [`DetectionEngine::new`] with an explicit base window size. The
    /// effective window is `base + overlap`.
    pub fn with_base_window(detectors: Vec<Arc<dyn Detector>>, base: usize) -> Result<Self> {
        if detectors.is_empty() {
            bail!("detection engine needs at least one detector");
        }
        if base == 0 {
            bail!("base window must be non-zero");
        }

        let mut patterns: Vec<&[u8]> = Vec::new();
        let mut ac_owner = Vec::new();
        let mut always_run = Vec::with_capacity(detectors.len());
        let mut overlap = 0usize;
        for (idx, det) in detectors.iter().enumerate() {
            overlap = overlap.max(det.max_len());
            let prefixes = det.prefixes();
            always_run.push(prefixes.is_empty());
            for &prefix in prefixes {
                patterns.push(prefix);
                ac_owner.push(idx);
            }
        }
        let ac = AhoCorasick::new(&patterns)
            .context("failed to build detector prefix automaton")?;

        debug!(
            detectors = detectors.len(),
            overlap,
            window = base + overlap,
            "detection engine ready"
        );
        Ok(Self {
            detectors,
            ac,
            ac_owner,
            always_run,
            overlap,
            window: base + overlap,
        })
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn window_size(&self) -> usize {
        self.window
    }

    /// One Aho-Corasick pass marking which detectors have a literal prefix
    /// hit in this window. Prefix-less detectors are always candidates.
    fn candidate_detectors(&self, window: &[u8]) -> Vec<bool> {
        let mut candidates = self.always_run.clone();
        for m in self.ac.find_overlapping_iter(window) {
            candidates[self.ac_owner[m.pattern().as_usize()]] = true;
        }
        candidates
    }

    /// Scan a reader to completion and return findings ordered by ascending
    /// absolute offset (ties by detector registration order).
    ///
    /// Cancellation is checked at every window boundary; a cancelled scan
    /// returns [`EngineError::Cancelled`] with no partial results, and a
    /// read failure returns [`EngineError::Io`] with the in-flight window
    /// discarded.
    pub async fn scan<R>(
        &self,
        cancel: &CancellationToken,
        mut reader: R,
    ) -> Result<Vec<Finding>, EngineError>
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.window];
        let mut findings = Vec::new();
        let mut base: u64 = 0;

        let mut filled = fill_buffer(&mut reader, &mut buf, 0).await?;
        let mut at_eof = filled < self.window;

        loop {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let window = &buf[..filled];
            // Findings starting inside the tail that the next window will
            // re-show are deferred there; the final window emits everything.
            let emit_limit = if at_eof {
                filled
            } else {
                filled - self.overlap
            };

            let candidates = self.candidate_detectors(window);
            let mut batch: Vec<(usize, usize, Secret)> = Vec::new();
            for (idx, det) in self.detectors.iter().enumerate() {
                if !candidates[idx] {
                    continue;
                }
                for raw in det.detect(window) {
                    if raw.offset < emit_limit {
                        batch.push((raw.offset, idx, raw.secret));
                    }
                }
            }
            batch.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
            findings.extend(batch.into_iter().map(|(offset, _, secret)| Finding {
                secret,
                offset: base + offset as u64,
            }));

            if at_eof {
                break;
            }

            // Slide: keep the overlap tail, advance the stream base.
            let advance = filled - self.overlap;
            buf.copy_within(advance..filled, 0);
            base += advance as u64;
            let read = fill_buffer(&mut reader, &mut buf, self.overlap).await?;
            filled = self.overlap + read;
            at_eof = filled < self.window;
        }

        Ok(findings)
    }
}

/// Read until the buffer is full or the stream ends; returns bytes read.
async fn fill_buffer<R>(reader: &mut R, buf: &mut [u8], from: usize) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut at = from;
    while at < buf.len() {
        let n = reader.read(&mut buf[at..]).await?;
        if n == 0 {
            break;
        }
        at += n;
    }
    Ok(at - from)
}

#[cfg(test)]
mod tests;
