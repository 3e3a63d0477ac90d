use super::*;
use crate::secret::{AwsCredentials, Secret};

fn aws_pair() -> PairDetector {
    PairDetector::new(
        "aws_credentials",
        r"(AKIA|ASIA)[A-Z0-9]{16}",
        r"[A-Za-z0-9/+]{40}",
        40,
        10 * 1024,
        vec![b"AKIA", b"ASIA"],
        Box::new(|a, b| {
            Some(Secret::Aws(AwsCredentials {
                access_id: String::from_utf8(a.to_vec()).ok()?,
                secret: String::from_utf8(b.to_vec()).ok()?,
            }))
        }),
    )
    .unwrap()
}

const CREDENTIALS_FILE: &str = "[default]\naws_access_key_id = AKIA1984R439T439HTH4\naws_secret_access_key = 32r923jr023rk320rk2a3rkB34tj340r32Ckt433\n";

#[test]
fn pairs_id_with_nearby_secret() {
    let det = aws_pair();
    let findings = det.detect(CREDENTIALS_FILE.as_bytes());
    assert_eq!(findings.len(), 1);
    match &findings[0].secret {
        Secret::Aws(c) => {
            assert_eq!(c.access_id, "AKIA1984R439T439HTH4");
            assert_eq!(c.secret, "32r923jr023rk320rk2a3rkB34tj340r32Ckt433");
        }
        other => panic!("unexpected variant: {:?}", other),
    }
    // anchored at the earlier element
    assert_eq!(
        findings[0].offset,
        CREDENTIALS_FILE.find("AKIA").unwrap()
    );
}

#[test]
fn distance_beyond_limit_produces_nothing() {
    let det = aws_pair();
    let mut input = String::from("AKIA1984R439T439HTH4");
    input.push_str(&"\n".repeat(10 * 1024 + 1));
    input.push_str("32r923jr023rk320rk2a3rkB34tj340r32Ckt433");
    assert!(det.detect(input.as_bytes()).is_empty());
}

#[test]
fn distance_exactly_at_limit_pairs() {
    let det = aws_pair();
    let mut input = String::from("AKIA1984R439T439HTH4");
    input.push_str(&"\n".repeat(10 * 1024));
    input.push_str("32r923jr023rk320rk2a3rkB34tj340r32Ckt433");
    assert_eq!(det.detect(input.as_bytes()).len(), 1);
}

#[test]
fn missing_either_side_produces_nothing() {
    let det = aws_pair();
    assert!(det.detect(b"AKIA1984R439T439HTH4 alone").is_empty());
    assert!(det
        .detect(b"just 32r923jr023rk320rk2a3rkB34tj340r32Ckt433")
        .is_empty());
}

#[test]
fn each_secret_pairs_once() {
    let det = aws_pair();
    // Two ids competing for one secret: it pairs once, with the id seen first.
    let input = "AKIA1984R439T439HTH4 filler AKIA2984R439T439HTH4 32r923jr023rk320rk2a3rkB34tj340r32Ckt433";
    let findings = det.detect(input.as_bytes());
    assert_eq!(findings.len(), 1);
    match &findings[0].secret {
        Secret::Aws(c) => assert_eq!(c.access_id, "AKIA1984R439T439HTH4"),
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn equidistant_tie_breaks_to_earlier_start() {
    let det = PairDetector::new(
        "tie",
        r"ID[0-9]{2}",
        r"SEC[0-9]{2}",
        8,
        100,
        vec![],
        Box::new(|a, b| {
            Some(Secret::Aws(AwsCredentials {
                access_id: String::from_utf8(a.to_vec()).ok()?,
                secret: String::from_utf8(b.to_vec()).ok()?,
            }))
        }),
    )
    .unwrap();
    // SEC01 ends 4 bytes before ID00; SEC02 starts 4 bytes after it.
    let input = "SEC01----ID00----SEC02";
    let findings = det.detect(input.as_bytes());
    assert_eq!(findings.len(), 1);
    match &findings[0].secret {
        Secret::Aws(c) => assert_eq!(c.secret, "SEC01"),
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn span_gap_measures_end_to_start() {
    assert_eq!(span_gap((0, 5), (9, 12)), 4);
    assert_eq!(span_gap((9, 12), (0, 5)), 4);
    assert_eq!(span_gap((0, 5), (3, 8)), 0);
}
