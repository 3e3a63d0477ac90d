use anyhow::{Context, Result};
use regex::bytes::Regex;

use crate::detect::{Detector, RawFinding};
use crate::secret::Secret;

/// Constructor invoked per regex match. Returning `None` rejects the match
/// (structural predicate failed) without emitting anything.
pub type SecretCtor = Box<dyn Fn(&[u8]) -> Option<Secret> + Send + Sync>;

/// Bounded regex-over-window detector. The regex is anchored by content only
/// (a fixed prefix plus a bounded character class); matches longer than
/// `max_len` are discarded so the engine's overlap guarantee holds.
pub struct SimpleTokenDetector {
    name: &'static str,
    regex: Regex,
    max_len: usize,
    prefixes: Vec<&'static [u8]>,
    ctor: SecretCtor,
}

impl SimpleTokenDetector {
    pub fn new(
        name: &'static str,
        pattern: &str,
        max_len: usize,
        prefixes: Vec<&'static [u8]>,
        ctor: SecretCtor,
    ) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("failed to compile pattern for detector '{}'", name))?;
        Ok(Self {
            name,
            regex,
            max_len,
            prefixes,
            ctor,
        })
    }
}

impl Detector for SimpleTokenDetector {
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
        let mut findings = Vec::new();
        for m in self.regex.find_iter(window) {
            if m.len() > self.max_len {
                continue;
            }
            if let Some(secret) = (self.ctor)(m.as_bytes()) {
                findings.push(RawFinding {
                    secret,
                    offset: m.start(),
                });
            }
        }
        findings
    }
}

/// The common constructor: the whole match, as UTF-8, becomes the key.
pub fn utf8_key_ctor(family: crate::secret::SecretFamily) -> SecretCtor {
    Box::new(move |raw| {
        std::str::from_utf8(raw)
            .ok()
            .map(|key| Secret::simple(family, key))
    })
}

#[cfg(test)]
mod tests;
