// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use job_monitor::metrics::Metrics;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower::ServiceExt;

#[tokio::test]
async fn metrics_endpoint_renders_recorded_series() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::with_local_recorder(&recorder, || {
        metrics::counter!("scan_runs_total").increment(2);
        metrics::counter!("notify_errors_total", "transport" => "email").increment(1);
        metrics::gauge!("scan_last_run_ts").set(1_709_575_200.0);
    });

    let app = Metrics::from_handle(handle).router();
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("scan_runs_total 2"), "{text}");
    assert!(text.contains("notify_errors_total{transport=\"email\"} 1"), "{text}");
    assert!(text.contains("scan_last_run_ts"), "{text}");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let resp = Metrics::from_handle(handle)
        .router()
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
