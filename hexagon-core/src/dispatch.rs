//! 分发器
//!
//! 由一个路由条目和一个控制器实例构建，每次调用：
//!
//! 1. 按参数绑定从请求中提取值，未绑定的位置填 `Null`
//! 2. 以位置顺序调用处理函数并等待结果
//! 3. 把返回值序列化为 JSON 文本并通过响应发送
//!
//! 解码错误与控制器错误都原样返回给调用方。

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::metadata::{
    Arguments, BodyEncoding, Handle, Instance, ParamSource, ParameterBinding, RouteEntry,
};
use crate::request::{RequestFacets, ResponseSink};

/// 分发器
#[derive(Clone)]
pub struct Dispatcher {
    handle: Handle,
    parameters: Arc<BTreeMap<usize, ParameterBinding>>,
    arity: usize,
    instance: Instance,
}

impl Dispatcher {
    /// 构建分发器
    ///
    /// 条目缺少处理函数时返回 [`DispatchError::MissingHandle`]
    pub fn build(entry: &RouteEntry, instance: Instance) -> Result<Self, DispatchError> {
        let handle = entry.handle.clone().ok_or(DispatchError::MissingHandle)?;

        Ok(Self {
            handle,
            parameters: Arc::new(entry.parameters.clone().unwrap_or_default()),
            arity: entry.arity(),
            instance,
        })
    }

    /// 调用参数个数
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// 从请求中解析出位置实参
    pub fn resolve_arguments<R>(&self, request: &R) -> Result<Arguments, DispatchError>
    where
        R: RequestFacets + ?Sized,
    {
        let mut values = vec![Value::Null; self.arity];
        for (&position, binding) in self.parameters.iter() {
            values[position] = resolve(binding, request)?;
        }
        Ok(Arguments::new(values))
    }

    /// 调用处理函数，返回未序列化的结果
    pub async fn invoke<R>(&self, request: &R) -> Result<Value, DispatchError>
    where
        R: RequestFacets + ?Sized,
    {
        let args = self.resolve_arguments(request)?;
        let pending = self.handle.invoke(Arc::clone(&self.instance), args)?;
        pending.await.map_err(|e| match e.downcast::<DispatchError>() {
            // 处理函数内部的实参解码失败保持原分类
            Ok(inner) => inner,
            Err(e) => DispatchError::Invocation(e),
        })
    }

    /// 完整分发：解析、调用、序列化并发送
    pub async fn dispatch<R, S>(&self, request: &R, response: &mut S) -> Result<(), DispatchError>
    where
        R: RequestFacets + ?Sized,
        S: ResponseSink + ?Sized,
    {
        let value = self.invoke(request).await?;
        let text = serde_json::to_string(&value).map_err(DispatchError::Serialize)?;
        response.send(text);
        Ok(())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handle", &self.handle)
            .field("parameters", &self.parameters)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

fn resolve<R>(binding: &ParameterBinding, request: &R) -> Result<Value, DispatchError>
where
    R: RequestFacets + ?Sized,
{
    let name = binding.name.as_str();
    let value = match binding.source {
        ParamSource::Path => text(request.path_param(name)),
        ParamSource::Querystring => text(request.query_param(name)),
        ParamSource::Header => text(request.header(name)),
        ParamSource::Body if name == BodyEncoding::Raw.as_str() => text(request.body()),
        // 缺少请求体时按空文本解析，同样报解码错误
        ParamSource::Body if name == BodyEncoding::Json.as_str() => {
            serde_json::from_str(request.body().unwrap_or_default())
                .map_err(DispatchError::BodyDecode)?
        }
        ParamSource::Body => {
            tracing::debug!("Unknown body decoding '{}', passing null", name);
            Value::Null
        }
    };
    Ok(value)
}

fn text(value: Option<&str>) -> Value {
    value.map(|v| Value::String(v.to_string())).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::HttpMethod;
    use crate::request::{RestRequest, TextResponse};
    use parking_lot::Mutex;
    use serde_json::json;

    /// 记录每次调用收到的参数
    #[derive(Default)]
    struct Probe {
        calls: Mutex<Vec<Vec<Value>>>,
    }

    fn recording_entry(parameters: Vec<(usize, ParameterBinding)>) -> RouteEntry {
        let handle = Handle::new(|probe: Arc<Probe>, args: Arguments| async move {
            probe.calls.lock().push(args.into_inner());
            Ok::<_, anyhow::Error>(json!("return-value"))
        });

        RouteEntry {
            http_method: Some(HttpMethod::Get),
            path: Some("/path-value".to_string()),
            handle: Some(handle),
            parameters: if parameters.is_empty() {
                None
            } else {
                Some(parameters.into_iter().collect())
            },
        }
    }

    async fn run(entry: RouteEntry, request: RestRequest) -> (Vec<Value>, Option<String>) {
        let probe = Arc::new(Probe::default());
        let dispatcher = Dispatcher::build(&entry, probe.clone()).unwrap();

        let mut response = TextResponse::new();
        dispatcher.dispatch(&request, &mut response).await.unwrap();

        let calls = probe.calls.lock().clone();
        assert_eq!(calls.len(), 1);
        (calls[0].clone(), response.into_body())
    }

    #[tokio::test]
    async fn test_no_parameters_means_no_arguments() {
        let (args, body) = run(recording_entry(vec![]), RestRequest::new()).await;
        assert!(args.is_empty());
        assert_eq!(body.as_deref(), Some("\"return-value\""));
    }

    #[tokio::test]
    async fn test_path_param() {
        let entry = recording_entry(vec![(0, ParameterBinding::path("id"))]);
        let request = RestRequest::new().path_param_value("id", "42");

        let (args, _) = run(entry, request).await;
        assert_eq!(args, vec![json!("42")]);
    }

    #[tokio::test]
    async fn test_query_param_present_and_absent() {
        let entry = recording_entry(vec![(0, ParameterBinding::query("search"))]);

        let (args, _) = run(entry.clone(), RestRequest::new().query_value("search", "x")).await;
        assert_eq!(args, vec![json!("x")]);

        let (args, _) = run(entry, RestRequest::new()).await;
        assert_eq!(args, vec![Value::Null]);
    }

    #[tokio::test]
    async fn test_header_param() {
        let entry = recording_entry(vec![(0, ParameterBinding::header("param-1"))]);
        let request = RestRequest::new().header_value("param-1", "param-1-value");

        let (args, _) = run(entry, request).await;
        assert_eq!(args, vec![json!("param-1-value")]);
    }

    #[tokio::test]
    async fn test_raw_and_json_body() {
        let body = r#"{"foo":"bar"}"#;

        let raw = recording_entry(vec![(0, ParameterBinding::body(BodyEncoding::Raw))]);
        let (args, _) = run(raw, RestRequest::new().with_body(body)).await;
        assert_eq!(args, vec![json!(body)]);

        let parsed = recording_entry(vec![(0, ParameterBinding::body(BodyEncoding::Json))]);
        let (args, _) = run(parsed, RestRequest::new().with_body(body)).await;
        assert_eq!(args, vec![json!({ "foo": "bar" })]);
    }

    #[tokio::test]
    async fn test_missing_json_body_is_decode_error() {
        let entry = recording_entry(vec![(0, ParameterBinding::body(BodyEncoding::Json))]);
        let probe = Arc::new(Probe::default());
        let dispatcher = Dispatcher::build(&entry, probe.clone()).unwrap();

        let err = dispatcher.invoke(&RestRequest::new()).await.unwrap_err();
        assert!(matches!(err, DispatchError::BodyDecode(_)));
        assert!(probe.calls.lock().is_empty());

        // 原样传递的请求体缺失时仍为 null
        let raw = recording_entry(vec![(0, ParameterBinding::body(BodyEncoding::Raw))]);
        let (args, _) = run(raw, RestRequest::new()).await;
        assert_eq!(args, vec![Value::Null]);
    }

    #[tokio::test]
    async fn test_typed_path_param_is_decoded_by_handler() {
        struct Pages;
        let entry = RouteEntry {
            handle: Some(Handle::new(|_: Arc<Pages>, args: Arguments| async move {
                let page: u32 = args.decode(0)?;
                Ok::<_, anyhow::Error>(json!(page + 1))
            })),
            parameters: Some([(0, ParameterBinding::path("page"))].into_iter().collect()),
            ..RouteEntry::default()
        };
        let dispatcher = Dispatcher::build(&entry, Arc::new(Pages)).unwrap();

        let value = dispatcher
            .invoke(&RestRequest::new().path_param_value("page", "41"))
            .await
            .unwrap();
        assert_eq!(value, json!(42));
    }

    #[tokio::test]
    async fn test_gaps_keep_positional_alignment() {
        let entry = recording_entry(vec![
            (2, ParameterBinding::query("page")),
            (0, ParameterBinding::path("id")),
        ]);
        let request = RestRequest::new()
            .path_param_value("id", "7")
            .query_value("page", "3");

        let (args, _) = run(entry, request).await;
        assert_eq!(args, vec![json!("7"), Value::Null, json!("3")]);
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_propagated() {
        let entry = recording_entry(vec![(0, ParameterBinding::body(BodyEncoding::Json))]);
        let probe = Arc::new(Probe::default());
        let dispatcher = Dispatcher::build(&entry, probe.clone()).unwrap();

        let mut response = TextResponse::new();
        let err = dispatcher
            .dispatch(&RestRequest::new().with_body("{not json"), &mut response)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::BodyDecode(_)));
        assert!(err.is_decode_error());
        assert!(probe.calls.lock().is_empty());
        assert!(response.body().is_none());
    }

    #[tokio::test]
    async fn test_invocation_error_is_propagated() {
        struct Failing;
        let entry = RouteEntry {
            handle: Some(Handle::new(|_: Arc<Failing>, _: Arguments| async {
                Err::<Value, _>(anyhow::anyhow!("boom"))
            })),
            ..RouteEntry::default()
        };
        let dispatcher = Dispatcher::build(&entry, Arc::new(Failing)).unwrap();

        let err = dispatcher.invoke(&RestRequest::new()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Invocation(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_argument_decode_error_keeps_its_kind() {
        struct Typed;
        let entry = RouteEntry {
            handle: Some(Handle::new(|_: Arc<Typed>, args: Arguments| async move {
                let id: u32 = args.decode(0)?;
                Ok::<_, anyhow::Error>(json!(id))
            })),
            parameters: Some([(0, ParameterBinding::path("id"))].into_iter().collect()),
            ..RouteEntry::default()
        };
        let dispatcher = Dispatcher::build(&entry, Arc::new(Typed)).unwrap();

        let request = RestRequest::new().path_param_value("id", "not-a-number");
        let err = dispatcher.invoke(&request).await.unwrap_err();
        assert!(matches!(err, DispatchError::ArgumentDecode { position: 0, .. }));
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_missing_handle_is_rejected() {
        let entry = RouteEntry {
            http_method: Some(HttpMethod::Get),
            path: Some("/x".to_string()),
            ..RouteEntry::default()
        };
        let err = Dispatcher::build(&entry, Arc::new(Probe::default())).unwrap_err();
        assert!(matches!(err, DispatchError::MissingHandle));
    }

    #[tokio::test]
    async fn test_values_are_not_cached_between_calls() {
        let entry = recording_entry(vec![(0, ParameterBinding::path("id"))]);
        let probe = Arc::new(Probe::default());
        let dispatcher = Dispatcher::build(&entry, probe.clone()).unwrap();

        for id in ["1", "2"] {
            let mut response = TextResponse::new();
            let request = RestRequest::new().path_param_value("id", id);
            dispatcher.dispatch(&request, &mut response).await.unwrap();
        }

        assert_eq!(
            *probe.calls.lock(),
            vec![vec![json!("1")], vec![json!("2")]]
        );
    }
}
