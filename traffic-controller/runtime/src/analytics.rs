use crate::{
    core,
    metrics::AnalyticsMetrics,
    report::{ErrorBody, TrafficAnalytics},
    snapshot::{self, ObjectSource},
};
use futures::future;
use hyper::{http, Request, Response};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::time;
use tracing::{debug, info_span, trace, warn, Instrument};

/// Serves traffic classification reports over HTTP.
///
/// - `GET /traffic-analytics[?namespace=<ns>]`
/// - `GET /namespaces/<ns>/traffic-analytics`
///
/// Each request fetches a fresh snapshot and classifies it. If the snapshot
/// cannot be fetched, the engine is not run and a 502 is returned.
#[derive(Clone)]
pub struct Analytics {
    source: Arc<dyn ObjectSource>,
    service_label: Arc<str>,
    default_namespace: Option<Arc<str>>,
    metrics: AnalyticsMetrics,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to encode json response: {0}")]
    Json(#[from] serde_json::Error),
}

type Body = http_body_util::Full<bytes::Bytes>;

const PATH: &str = "/traffic-analytics";

// === impl Analytics ===

impl<B> tower::Service<Request<B>> for Analytics {
    type Response = Response<Body>;
    type Error = Error;
    type Future = future::BoxFuture<'static, Result<Response<Body>, Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        trace!(method = %req.method(), uri = %req.uri());
        let Some(scope) = self.scope(req.uri()) else {
            return Box::pin(future::ok(empty_response(http::StatusCode::NOT_FOUND)));
        };
        if req.method() != http::Method::GET {
            self.metrics.bad_request();
            return Box::pin(future::ok(empty_response(
                http::StatusCode::METHOD_NOT_ALLOWED,
            )));
        }

        let analytics = self.clone();
        let span = info_span!("analyze", namespace = scope.as_deref().unwrap_or("*"));
        Box::pin(analytics.analyze(scope).instrument(span))
    }
}

impl Analytics {
    pub fn new(
        source: Arc<dyn ObjectSource>,
        service_label: impl Into<Arc<str>>,
        default_namespace: Option<String>,
        metrics: AnalyticsMetrics,
    ) -> Self {
        Self {
            source,
            service_label: service_label.into(),
            default_namespace: default_namespace.map(Into::into),
            metrics,
        }
    }

    /// Determines the namespace a request is scoped to, or `None` if the
    /// path is not served. The inner `None` is cluster-wide.
    fn scope(&self, uri: &http::Uri) -> Option<Option<String>> {
        let path = uri.path();
        if path == PATH {
            let namespace = uri
                .query()
                .and_then(|q| {
                    url::form_urlencoded::parse(q.as_bytes())
                        .find(|(k, _)| k == "namespace")
                        .map(|(_, v)| v.into_owned())
                })
                .filter(|ns| !ns.is_empty())
                .or_else(|| self.default_namespace.as_deref().map(String::from));
            return Some(namespace);
        }

        let ns = path
            .strip_prefix("/namespaces/")?
            .strip_suffix(PATH)
            .filter(|ns| !ns.is_empty() && !ns.contains('/'))?;
        Some(Some(ns.to_string()))
    }

    async fn analyze(self, namespace: Option<String>) -> Result<Response<Body>, Error> {
        let start = time::Instant::now();
        let snapshot = match snapshot::fetch(self.source.as_ref(), namespace.as_deref()).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "Failed to fetch traffic snapshot");
                self.metrics.fetch_failed(start.elapsed());
                return json_response(
                    http::StatusCode::BAD_GATEWAY,
                    &ErrorBody {
                        error: error.to_string(),
                    },
                );
            }
        };

        let report = core::analyze_with(&snapshot, &self.service_label);
        self.metrics.analyzed(&report.totals, start.elapsed());
        debug!(
            instances = report.totals.instance_count,
            records = report.records.len(),
            "Analyzed traffic"
        );
        json_response(http::StatusCode::OK, &TrafficAnalytics::from(report))
    }
}

fn json_response<T: Serialize>(status: http::StatusCode, body: &T) -> Result<Response<Body>, Error> {
    let bytes = serde_json::to_vec(body)?;
    Ok(Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("traffic analytics response must be valid"))
}

fn empty_response(status: http::StatusCode) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::default())
        .expect("empty response must be valid")
}
