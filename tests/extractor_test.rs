//! 入站关联提取测试

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use flare_correlation::{
    CallContext, CorrelationExtractor, CorrelationRecord, IdGenerator, record_from_metadata,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;
use tonic::metadata::MetadataMap;

/// 按序号生成ID，便于断言
struct SequenceGenerator {
    next: AtomicUsize,
}

impl IdGenerator for SequenceGenerator {
    fn generate(&self) -> String {
        format!("gen-{}", self.next.fetch_add(1, Ordering::SeqCst))
    }
}

fn metadata(pairs: &[(&'static str, &str)]) -> MetadataMap {
    let mut md = MetadataMap::new();
    for (key, value) in pairs {
        md.insert(*key, value.parse().unwrap());
    }
    md
}

#[test]
fn present_request_id_is_kept_verbatim() {
    let extractor = CorrelationExtractor::new();
    let md = metadata(&[("x-request-id", "req-42"), ("x-user-id", "u-7")]);

    let ctx = extractor.extract(&CallContext::new(), &md);
    let record = ctx.correlation().unwrap();

    assert_eq!(record.request_id(), "req-42");
    assert_eq!(record.session_id(), "");
    assert_eq!(record.user_id(), "u-7");
}

#[test]
fn empty_metadata_generates_request_id() {
    let extractor = CorrelationExtractor::new();

    let ctx = extractor.extract(&CallContext::new(), &MetadataMap::new());
    let record = ctx.correlation().unwrap();

    assert!(!record.request_id().is_empty());
    assert_eq!(record.session_id(), "");
    assert_eq!(record.user_id(), "");
}

#[test]
fn generated_request_ids_do_not_collide() {
    let extractor = CorrelationExtractor::new();
    let parent = CallContext::new();

    let ids: HashSet<String> = (0..1000)
        .map(|_| {
            extractor
                .extract(&parent, &MetadataMap::new())
                .correlation()
                .unwrap()
                .request_id()
                .to_string()
        })
        .collect();

    assert_eq!(ids.len(), 1000);
}

#[test]
fn custom_generator_fills_missing_request_id() {
    let extractor = CorrelationExtractor::with_generator(Arc::new(SequenceGenerator {
        next: AtomicUsize::new(1),
    }));

    let first = extractor.extract(&CallContext::new(), &MetadataMap::new());
    let second = extractor.extract(&CallContext::new(), &MetadataMap::new());

    assert_eq!(first.correlation().unwrap().request_id(), "gen-1");
    assert_eq!(second.correlation().unwrap().request_id(), "gen-2");
}

#[test]
fn header_lookup_is_case_insensitive_and_first_value_wins() {
    let mut headers = HeaderMap::new();
    headers.append(
        HeaderName::from_bytes(b"X-Request-ID").unwrap(),
        HeaderValue::from_static("first"),
    );
    headers.append(
        HeaderName::from_bytes(b"x-request-id").unwrap(),
        HeaderValue::from_static("second"),
    );
    headers.insert(
        HeaderName::from_bytes(b"X-Session-Id").unwrap(),
        HeaderValue::from_static("s1"),
    );
    let md = MetadataMap::from_headers(headers);

    let record = record_from_metadata(&md);

    assert_eq!(record, CorrelationRecord::new("first", "s1", ""));
}

#[test]
fn non_ascii_value_degrades_to_empty() {
    let mut headers = HeaderMap::new();
    headers.insert("x-request-id", HeaderValue::from_static("r1"));
    headers.insert("x-session-id", HeaderValue::from_bytes(b"caf\xe9").unwrap());
    let md = MetadataMap::from_headers(headers);

    let ctx = CorrelationExtractor::new().extract(&CallContext::new(), &md);
    let record = ctx.correlation().unwrap();

    assert_eq!(record.request_id(), "r1");
    assert_eq!(record.session_id(), "");
}

#[test]
fn nested_extraction_keeps_request_id() {
    let extractor = CorrelationExtractor::new();
    let md = metadata(&[("x-request-id", "abc")]);

    let outer = extractor.extract(&CallContext::new(), &md);
    let inner = extractor.extract(&outer, &md);
    assert_eq!(inner.correlation().unwrap().request_id(), "abc");

    let generated = extractor.extract(&CallContext::new(), &MetadataMap::new());
    let nested = extractor.extract(&generated, &MetadataMap::new());
    assert_eq!(
        nested.correlation().unwrap().request_id(),
        generated.correlation().unwrap().request_id()
    );
}

#[test]
fn child_context_inherits_deadline_and_cancellation() {
    let token = CancellationToken::new();
    let parent = CallContext::new()
        .with_timeout(Duration::from_secs(30))
        .with_cancellation_token(token.clone());

    let child = CorrelationExtractor::new().extract(&parent, &metadata(&[("x-request-id", "r1")]));

    assert_eq!(child.deadline(), parent.deadline());
    assert!(parent.correlation().is_none());
    assert!(!child.is_cancelled());

    token.cancel();
    assert!(child.is_cancelled());
}
