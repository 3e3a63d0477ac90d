use super::*;
use crate::secret::SecretFamily;

fn anthropic() -> SimpleTokenDetector {
    SimpleTokenDetector::new(
        "anthropic_model",
        r"sk-ant-api03-[A-Za-z0-9_\-]{16,150}",
        164,
        vec![b"sk-ant-api03-"],
        utf8_key_ctor(SecretFamily::AnthropicModel),
    )
    .unwrap()
}

#[test]
fn finds_key_with_window_relative_offset() {
    let det = anthropic();
    let window = format!("ANTHROPIC_API_KEY=sk-ant-api03-{}-Zz0_", "A".repeat(50));
    let findings = det.detect(window.as_bytes());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].offset, 18);
    match &findings[0].secret {
        crate::secret::Secret::Simple(k) => {
            assert_eq!(k.family, SecretFamily::AnthropicModel);
            assert_eq!(k.key, format!("sk-ant-api03-{}-Zz0_", "A".repeat(50)));
        }
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn emission_order_matches_occurrence_order() {
    let det = anthropic();
    let window = format!(
        "a sk-ant-api03-{} b sk-ant-api03-{} c",
        "x".repeat(20),
        "y".repeat(20)
    );
    let findings = det.detect(window.as_bytes());
    assert_eq!(findings.len(), 2);
    assert!(findings[0].offset < findings[1].offset);
}

#[test]
fn over_length_match_is_discarded() {
    let det = SimpleTokenDetector::new(
        "tiny",
        r"tok_[a-z]{4,64}",
        12, // allows tok_ + 8
        vec![b"tok_"],
        utf8_key_ctor(SecretFamily::OpenAi),
    )
    .unwrap();
    assert_eq!(det.detect(b"tok_abcdefgh").len(), 1);
    assert!(det.detect(b"tok_abcdefghijklmnop").is_empty());
}

#[test]
fn ctor_rejection_is_silent() {
    let det = SimpleTokenDetector::new(
        "never",
        r"tok_[a-z]{4}",
        16,
        vec![b"tok_"],
        Box::new(|_| None),
    )
    .unwrap();
    assert!(det.detect(b"tok_abcd").is_empty());
}

#[test]
fn bad_pattern_is_a_construction_error() {
    let res = SimpleTokenDetector::new(
        "broken",
        r"tok_[",
        16,
        vec![],
        utf8_key_ctor(SecretFamily::OpenAi),
    );
    assert!(res.is_err());
}

#[test]
fn no_match_on_plain_text() {
    let det = anthropic();
    assert!(det
        .detect(b"nothing to see here, just prose about API keys")
        .is_empty());
}
