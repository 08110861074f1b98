//! 请求与响应抽象
//!
//! 分发器只依赖这里的两个 trait，具体的传输层（axum、无服务器平台事件等）负责实现它们

use std::collections::HashMap;

/// 请求的可寻址部分：路径参数、查询参数、请求头与请求体
pub trait RequestFacets {
    fn path_param(&self, name: &str) -> Option<&str>;

    fn query_param(&self, name: &str) -> Option<&str>;

    /// 请求头名称的大小写处理由传输层决定
    fn header(&self, name: &str) -> Option<&str>;

    /// 已读取的原始请求体
    fn body(&self) -> Option<&str>;
}

/// 响应：只需要一个发送文本的能力
pub trait ResponseSink {
    fn send(&mut self, text: String);
}

/// 基于 HashMap 的请求实现
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestRequest {
    path_params: HashMap<String, String>,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Option<String>,
}

impl RestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_params(mut self, params: HashMap<String, String>) -> Self {
        self.path_params = params;
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn path_param_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn query_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn header_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl RequestFacets for RestRequest {
    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// 收集发送内容的响应实现
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextResponse {
    body: Option<String>,
}

impl TextResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn into_body(self) -> Option<String> {
        self.body
    }
}

impl ResponseSink for TextResponse {
    fn send(&mut self, text: String) {
        self.body = Some(text);
    }
}
