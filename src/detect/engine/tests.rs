use super::*;
use crate::detect::simple::{SimpleTokenDetector, utf8_key_ctor};
use crate::detect::{Detector, RawFinding};
use crate::secret::SecretFamily;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

fn anthropic_detector() -> Arc<dyn Detector> {
    Arc::new(
        SimpleTokenDetector::new(
            "anthropic_model",
            r"sk-ant-api03-[A-Za-z0-9_\-]{16,150}",
            164,
            vec![b"sk-ant-api03-"],
            utf8_key_ctor(SecretFamily::AnthropicModel),
        )
        .unwrap(),
    )
}

fn key() -> String {
    format!("sk-ant-api03-{}-Zz0_", "A".repeat(50))
}

/// Filler that can never contribute to a match.
fn stream_with_key_at(total: usize, at: usize) -> Vec<u8> {
    let key = key();
    assert!(at + key.len() <= total);
    let mut bytes = vec![b' '; total];
    bytes[at..at + key.len()].copy_from_slice(key.as_bytes());
    bytes
}

async fn scan_all(engine: &DetectionEngine, bytes: Vec<u8>) -> Vec<Finding> {
    let cancel = CancellationToken::new();
    engine.scan(&cancel, Cursor::new(bytes)).await.unwrap()
}

#[tokio::test]
async fn single_secret_found_once_at_every_stream_size() {
    let engine = DetectionEngine::with_base_window(vec![anthropic_detector()], 4096).unwrap();
    let key_len = key().len();
    for total in [key_len, key_len + 1, 64 * 1024, 256 * 1024] {
        for at in [0, total.saturating_sub(key_len) / 2, total - key_len] {
            let findings = scan_all(&engine, stream_with_key_at(total, at)).await;
            assert_eq!(findings.len(), 1, "total={} at={}", total, at);
            assert_eq!(findings[0].offset, at as u64, "total={} at={}", total, at);
        }
    }
}

#[tokio::test]
async fn secret_straddling_window_boundary_is_emitted_once() {
    let engine = DetectionEngine::with_base_window(vec![anthropic_detector()], 1024).unwrap();
    assert_eq!(engine.overlap(), 164);
    // Place the key across the first emit limit (window - overlap = 1024).
    let at = engine.window_size() - engine.overlap() - 20;
    let findings = scan_all(&engine, stream_with_key_at(8 * 1024, at)).await;
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].offset, at as u64);
}

#[tokio::test]
async fn secret_inside_every_overlap_region_is_never_duplicated() {
    let engine = DetectionEngine::with_base_window(vec![anthropic_detector()], 1024).unwrap();
    let key_len = key().len();
    let total = 4 * engine.window_size();
    // Sweep positions around each window boundary.
    for boundary in 1..=3 {
        let edge = boundary * (engine.window_size() - engine.overlap());
        for delta in [-(key_len as i64), -10, 0, 10] {
            let at = (edge as i64 + delta) as usize;
            let findings = scan_all(&engine, stream_with_key_at(total, at)).await;
            assert_eq!(findings.len(), 1, "boundary={} delta={}", boundary, delta);
            assert_eq!(findings[0].offset, at as u64);
        }
    }
}

#[tokio::test]
async fn findings_are_ordered_with_registration_tie_break() {
    let first: Arc<dyn Detector> = Arc::new(
        SimpleTokenDetector::new(
            "first",
            r"tok_[a-z]{8}",
            16,
            vec![b"tok_"],
            utf8_key_ctor(SecretFamily::DenoUser),
        )
        .unwrap(),
    );
    let second: Arc<dyn Detector> = Arc::new(
        SimpleTokenDetector::new(
            "second",
            r"tok_[a-z]{8}",
            16,
            vec![b"tok_"],
            utf8_key_ctor(SecretFamily::DenoOrg),
        )
        .unwrap(),
    );
    let engine = DetectionEngine::new(vec![first, second]).unwrap();
    let findings = scan_all(&engine, b"tok_abcdefgh then tok_ijklmnop".to_vec()).await;
    assert_eq!(findings.len(), 4);
    assert_eq!(findings[0].offset, 0);
    assert_eq!(findings[0].secret.label(), "deno_user");
    assert_eq!(findings[1].offset, 0);
    assert_eq!(findings[1].secret.label(), "deno_org");
    assert_eq!(findings[2].offset, 18);
    assert_eq!(findings[3].offset, 18);
}

struct CountingDetector {
    calls: AtomicUsize,
}

impl Detector for CountingDetector {
    fn name(&self) -> &'static str {
        "counting"
    }
    fn max_len(&self) -> usize {
        16
    }
    fn prefixes(&self) -> &[&'static [u8]] {
        const P: &[&[u8]] = &[b"zzz!"];
        P
    }
    fn detect(&self, _window: &[u8]) -> Vec<RawFinding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Vec::new()
    }
}

#[tokio::test]
async fn prefilter_skips_detectors_without_prefix_hits() {
    let counting = Arc::new(CountingDetector {
        calls: AtomicUsize::new(0),
    });
    let engine = DetectionEngine::new(vec![counting.clone() as Arc<dyn Detector>]).unwrap();

    let cancel = CancellationToken::new();
    engine
        .scan(&cancel, Cursor::new(b"no trigger material here".to_vec()))
        .await
        .unwrap();
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);

    engine
        .scan(&cancel, Cursor::new(b"now with zzz! inside".to_vec()))
        .await
        .unwrap();
    assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancelled_before_first_window_yields_no_findings() {
    let engine = DetectionEngine::new(vec![anthropic_detector()]).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = engine
        .scan(&cancel, Cursor::new(stream_with_key_at(1024, 10)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));
}

struct FailingReader;

impl tokio::io::AsyncRead for FailingReader {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        _buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        std::task::Poll::Ready(Err(std::io::Error::other("disk on fire")))
    }
}

#[tokio::test]
async fn read_failure_surfaces_as_io_error() {
    let engine = DetectionEngine::new(vec![anthropic_detector()]).unwrap();
    let cancel = CancellationToken::new();
    let err = engine.scan(&cancel, FailingReader).await.unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));
}

#[tokio::test]
async fn empty_stream_yields_no_findings() {
    let engine = DetectionEngine::new(vec![anthropic_detector()]).unwrap();
    let cancel = CancellationToken::new();
    let findings = engine
        .scan(&cancel, Cursor::new(Vec::new()))
        .await
        .unwrap();
    assert!(findings.is_empty());
}

#[test]
fn empty_detector_list_is_an_error() {
    assert!(DetectionEngine::new(Vec::new()).is_err());
}
