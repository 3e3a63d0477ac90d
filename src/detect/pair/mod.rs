use anyhow::{Context, Result};
use regex::bytes::Regex;

use crate::detect::{Detector, RawFinding};
use crate::secret::Secret;

/// Constructor invoked per correlated pair: `(a_bytes, b_bytes)`.
pub type PairCtor = Box<dyn Fn(&[u8], &[u8]) -> Option<Secret> + Send + Sync>;

/// Proximity-correlation detector: matches of two regexes are paired when
/// they appear within a configured byte distance of each other.
///
/// Distance is measured from the end of the earlier match to the start of
/// the later one; overlapping matches count as distance zero. Each A-match
/// pairs with the closest unpaired B-match within range, ties broken by the
/// earlier B start. Either side empty produces nothing.
pub struct PairDetector {
    name: &'static str,
    re_a: Regex,
    re_b: Regex,
    max_el: usize,
    max_distance: usize,
    max_len: usize,
    prefixes: Vec<&'static [u8]>,
    ctor: PairCtor,
}

impl PairDetector {
    pub fn new(
        name: &'static str,
        pattern_a: &str,
        pattern_b: &str,
        max_el: usize,
        max_distance: usize,
        prefixes: Vec<&'static [u8]>,
        ctor: PairCtor,
    ) -> Result<Self> {
        let re_a = Regex::new(pattern_a)
            .with_context(|| format!("failed to compile element-A pattern for '{}'", name))?;
        let re_b = Regex::new(pattern_b)
            .with_context(|| format!("failed to compile element-B pattern for '{}'", name))?;
        Ok(Self {
            name,
            re_a,
            re_b,
            max_el,
            max_distance,
            // A full pair must fit inside the engine overlap: both elements
            // plus the widest permitted gap.
            max_len: max_el * 2 + max_distance,
            prefixes,
            ctor,
        })
    }
}

/// Gap in bytes between two spans: end of the earlier to start of the later.
fn span_gap(a: (usize, usize), b: (usize, usize)) -> usize {
    if b.0 >= a.1 {
        b.0 - a.1
    } else if a.0 >= b.1 {
        a.0 - b.1
    } else {
        0
    }
}

impl Detector for PairDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn prefixes(&self) -> &[&'static [u8]] {
        &self.prefixes
    }

    fn detect(&self, window: &[u8]) -> Vec<RawFinding> {
        let a_spans: Vec<(usize, usize)> = self
            .re_a
            .find_iter(window)
            .filter(|m| m.len() <= self.max_el)
            .map(|m| (m.start(), m.end()))
            .collect();
        if a_spans.is_empty() {
            return Vec::new();
        }
        let b_spans: Vec<(usize, usize)> = self
            .re_b
            .find_iter(window)
            .filter(|m| m.len() <= self.max_el)
            .map(|m| (m.start(), m.end()))
            .collect();
        if b_spans.is_empty() {
            return Vec::new();
        }

        let mut used = vec![false; b_spans.len()];
        let mut findings = Vec::new();
        for &a in &a_spans {
            let mut best: Option<(usize, usize)> = None; // (gap, b index)
            for (i, &b) in b_spans.iter().enumerate() {
                if used[i] {
                    continue;
                }
                let gap = span_gap(a, b);
                if gap > self.max_distance {
                    continue;
                }
                // Strictly-smaller gap wins; equal gap keeps the earlier B,
                // which is the one seen first in window order.
                if best.is_none_or(|(g, _)| gap < g) {
                    best = Some((gap, i));
                }
            }
            let Some((_, i)) = best else {
                continue;
            };
            used[i] = true;
            let b = b_spans[i];
            if let Some(secret) = (self.ctor)(&window[a.0..a.1], &window[b.0..b.1]) {
                findings.push(RawFinding {
                    secret,
                    offset: a.0.min(b.0),
                });
            }
        }
        findings.sort_by_key(|f| f.offset);
        findings
    }
}

#[cfg(test)]
mod tests;
