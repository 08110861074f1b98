//! Axum 适配器
//!
//! 把注册表中的路由绑定到 `axum::Router`。每个请求被转换为 [`RestRequest`]，
//! 交给对应的 [`Dispatcher`]，分发结果以 JSON 文本返回

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Router,
};
use hexagon_core::{
    bind_routes, BindError, Dispatcher, HttpMethod, Registry, RestRequest, RouteSink,
    TextResponse,
};
use std::collections::{HashMap, HashSet};

use crate::error::WebError;

/// 基于 `axum::Router` 的路由注册入口
#[derive(Default)]
pub struct RestRouter {
    router: Router,
    bound: HashSet<(HttpMethod, String)>,
}

impl RestRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已注册的路由数量
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl RouteSink for RestRouter {
    fn add_route(&mut self, method: HttpMethod, path: &str, dispatcher: Dispatcher) {
        // axum 要求路径以 `/` 开头
        if !path.starts_with('/') {
            tracing::warn!("⚠️ Skipping {} '{}': path must start with '/'", method, path);
            return;
        }
        if !self.bound.insert((method, path.to_string())) {
            tracing::warn!("⚠️ Skipping duplicate route {} {}", method, path);
            return;
        }

        let route = on(method_filter(method), handle).with_state(dispatcher);
        self.router = std::mem::take(&mut self.router).route(path, route);
    }
}

/// 从注册表构建 axum 路由
pub fn build_router(registry: &Registry) -> Result<Router, BindError> {
    let mut routes = RestRouter::new();
    let report = bind_routes(registry, &mut routes)?;

    tracing::info!(
        "📦 Bound {} routes from {} controllers ({} incomplete declarations skipped)",
        routes.len(),
        report.controllers,
        report.skipped
    );

    Ok(routes.into_router())
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Options => MethodFilter::OPTIONS,
    }
}

/// 单个请求的处理入口
async fn handle(
    State(dispatcher): State<Dispatcher>,
    path_params: Option<Path<HashMap<String, String>>>,
    Query(query): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let request = to_rest_request(
        path_params.map(|Path(params)| params).unwrap_or_default(),
        query,
        &headers,
        body,
    );

    let mut response = TextResponse::new();
    match dispatcher.dispatch(&request, &mut response).await {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            response.into_body().unwrap_or_default(),
        )
            .into_response(),
        Err(e) => {
            let error = WebError::from(e);
            if error.status_code().is_server_error() {
                tracing::error!(path = %uri.path(), error = %error, "Request dispatch failed");
            } else {
                tracing::debug!(path = %uri.path(), error = %error, "Rejected request");
            }
            error.to_error_response(uri.path()).into_response()
        }
    }
}

/// 把 axum 提取到的各部分转换为分发器使用的请求
///
/// 请求头名称已由 `http` 规范为小写；同名请求头只保留第一个值；空请求体视为没有请求体
fn to_rest_request(
    path_params: HashMap<String, String>,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: String,
) -> RestRequest {
    let mut header_values = HashMap::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            header_values
                .entry(name.as_str().to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    let request = RestRequest::new()
        .with_path_params(path_params)
        .with_query(query)
        .with_headers(header_values);

    if body.is_empty() {
        request
    } else {
        request.with_body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use hexagon_core::{Arguments, BodyEncoding, Handle};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[derive(Default)]
    struct EchoController;

    fn echo_handle() -> Handle {
        Handle::new(|_: Arc<EchoController>, args: Arguments| async move {
            Ok::<_, anyhow::Error>(Value::Array(args.into_inner()))
        })
    }

    fn failing_handle() -> Handle {
        Handle::new(|_: Arc<EchoController>, _: Arguments| async {
            Err::<Value, _>(anyhow::anyhow!("boom"))
        })
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_controller::<EchoController>();
        registry
            .annotate::<EchoController>()
            .get("show", "/items/:id", echo_handle())
            .path_param("show", 0, "id")
            .query_param("show", 1, "verbose")
            .header_param("show", 2, "x-trace")
            .post("create", "/items", echo_handle())
            .body("create", 0, BodyEncoding::Json)
            .put("replace", "/items/:id", echo_handle())
            .body_raw("replace", 0)
            .delete("remove", "/items/:id", failing_handle());
        registry
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let router = build_router(&registry()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_path_query_and_header_are_bound() {
        let request = Request::builder()
            .uri("/items/42?verbose=yes")
            .header("X-Trace", "abc")
            .body(Body::empty())
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["42", "yes", "abc"]));
    }

    #[tokio::test]
    async fn test_absent_values_are_null() {
        let request = Request::builder()
            .uri("/items/7")
            .body(Body::empty())
            .unwrap();

        let (_, body) = call(request).await;
        assert_eq!(body, json!(["7", null, null]));
    }

    #[tokio::test]
    async fn test_json_and_raw_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/items")
            .body(Body::from(r#"{"name":"pen"}"#))
            .unwrap();
        let (_, body) = call(request).await;
        assert_eq!(body, json!([{ "name": "pen" }]));

        let request = Request::builder()
            .method("PUT")
            .uri("/items/1")
            .body(Body::from("plain text"))
            .unwrap();
        let (_, body) = call(request).await;
        assert_eq!(body, json!(["plain text"]));
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/items")
            .body(Body::from("{oops"))
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["path"], "/items");
    }

    #[tokio::test]
    async fn test_empty_json_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/items")
            .body(Body::empty())
            .unwrap();

        let (status, _) = call(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_controller_error_is_internal_error() {
        let request = Request::builder()
            .method("DELETE")
            .uri("/items/1")
            .body(Body::empty())
            .unwrap();

        let (status, body) = call(request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "boom");
    }

    #[tokio::test]
    async fn test_unmapped_method_is_rejected() {
        let router = build_router(&registry()).unwrap();
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/items")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_invalid_and_duplicate_paths_are_skipped() {
        let mut registry = Registry::new();
        registry.register_controller::<EchoController>();
        registry
            .annotate::<EchoController>()
            .get("relative", "items", echo_handle())
            .get("first", "/items", echo_handle())
            .get("second", "/items", echo_handle());

        let mut routes = RestRouter::new();
        let report = bind_routes(&registry, &mut routes).unwrap();
        assert_eq!(report.routes, 3);
        assert_eq!(routes.len(), 1);
    }
}
