//! 拦截器与中间件测试

use std::convert::Infallible;

use flare_correlation::{
    CallContext, CorrelationClientInterceptor, CorrelationExtractor, CorrelationInjector,
    CorrelationLayer, CorrelationRecord, CorrelationServerInterceptor, call_context,
    with_inbound, with_outbound,
};
use tonic::service::Interceptor;
use tonic::metadata::MetadataMap;
use tonic::{Request, Status};
use tower::{Layer, ServiceExt, service_fn};

#[test]
fn server_interceptor_attaches_context() {
    let mut interceptor = CorrelationServerInterceptor::new();
    let mut req = Request::new(());
    req.metadata_mut().insert("x-request-id", "abc".parse().unwrap());
    req.metadata_mut().insert("x-user-id", "u1".parse().unwrap());

    let req = interceptor.call(req).unwrap();
    let ctx = call_context(&req);

    assert_eq!(ctx.correlation(), Some(&CorrelationRecord::new("abc", "", "u1")));
}

#[test]
fn server_interceptor_generates_missing_request_id() {
    let interceptor = CorrelationServerInterceptor::new();

    let req = interceptor.intercept(Request::new("body")).unwrap();
    let ctx = call_context(&req);

    assert!(ctx.correlation().unwrap().has_request_id());
    assert_eq!(*req.get_ref(), "body");
}

#[test]
fn client_interceptor_writes_headers_from_context() {
    let mut interceptor = CorrelationClientInterceptor::new();
    let mut req = Request::new(());
    req.metadata_mut().insert("x-custom", "v".parse().unwrap());
    req.extensions_mut()
        .insert(CallContext::new().with_correlation(CorrelationRecord::new("r1", "s1", "")));

    let req = interceptor.call(req).unwrap();

    assert_eq!(req.metadata().get("x-request-id").unwrap(), "r1");
    assert_eq!(req.metadata().get("x-session-id").unwrap(), "s1");
    assert_eq!(req.metadata().get("x-custom").unwrap(), "v");
    assert!(req.metadata().get("x-user-id").is_none());
}

#[test]
fn client_interceptor_keeps_request_metadata_outside_the_record() {
    let interceptor = CorrelationClientInterceptor::new();
    let mut outgoing = MetadataMap::new();
    outgoing.insert("x-custom", "from-ctx".parse().unwrap());
    outgoing.insert("x-session-id", "stale".parse().unwrap());
    let ctx = CallContext::new()
        .with_correlation(CorrelationRecord::new("r1", "", ""))
        .with_outgoing_metadata(outgoing);

    let mut req = Request::new(());
    req.metadata_mut().insert("x-custom", "from-request".parse().unwrap());
    req.metadata_mut().insert("x-session-id", "caller-set".parse().unwrap());
    req.extensions_mut().insert(ctx);

    let req = interceptor.intercept(req).unwrap();

    assert_eq!(req.metadata().get("x-request-id").unwrap(), "r1");
    assert_eq!(req.metadata().get("x-custom").unwrap(), "from-request");
    assert_eq!(req.metadata().get("x-session-id").unwrap(), "caller-set");
    assert_eq!(req.metadata().len(), 3);
}

#[test]
fn client_interceptor_passes_through_without_context() {
    let interceptor = CorrelationClientInterceptor::new();
    let mut req = Request::new(());
    req.metadata_mut().insert("x-custom", "v".parse().unwrap());

    let req = interceptor.intercept(req).unwrap();

    assert_eq!(req.metadata().len(), 1);
}

#[tokio::test]
async fn inbound_wrapper_passes_handler_result_through() {
    let mut md = MetadataMap::new();
    md.insert("x-request-id", "abc".parse().unwrap());
    let extractor = CorrelationExtractor::new();

    let ok: Result<String, Status> = with_inbound(&extractor, &CallContext::new(), &md, |ctx| async move {
        Ok(ctx.correlation().unwrap().request_id().to_string())
    })
    .await;
    assert_eq!(ok.unwrap(), "abc");

    let err: Result<String, Status> = with_inbound(&extractor, &CallContext::new(), &md, |_ctx| async {
        Err(Status::not_found("missing"))
    })
    .await;
    assert_eq!(err.unwrap_err().code(), tonic::Code::NotFound);
}

#[tokio::test]
async fn outbound_wrapper_hands_injected_context_to_next() {
    let ctx = CallContext::new().with_correlation(CorrelationRecord::new("r1", "", ""));

    let seen = with_outbound(&CorrelationInjector::new(), &ctx, |ctx| async move {
        ctx.outgoing_metadata()
            .and_then(|md| md.get("x-request-id"))
            .map(|v| v.to_str().unwrap().to_string())
    })
    .await;

    assert_eq!(seen.as_deref(), Some("r1"));
}

#[tokio::test]
async fn layer_inserts_context_and_returns_inner_response() {
    let service = CorrelationLayer::default().layer(service_fn(
        |req: http::Request<()>| async move {
            let ctx = req.extensions().get::<CallContext>().cloned().unwrap();
            Ok::<_, Infallible>(ctx.correlation().unwrap().clone())
        },
    ));

    let req = http::Request::builder()
        .header("X-Request-Id", "abc")
        .header("x-session-id", "s1")
        .body(())
        .unwrap();
    let record = service.oneshot(req).await.unwrap();

    assert_eq!(record, CorrelationRecord::new("abc", "s1", ""));
}

#[tokio::test]
async fn layer_passes_inner_error_through() {
    let service = CorrelationLayer::default().layer(service_fn(|_req: http::Request<()>| async {
        Err::<(), _>(Status::unavailable("down"))
    }));

    let err = service
        .oneshot(http::Request::new(()))
        .await
        .unwrap_err();

    assert_eq!(err.code(), tonic::Code::Unavailable);
}
