//! 路由元数据模型
//!
//! 每个控制器类型拥有一张 [`RouteTable`]，以方法名（property key）为键，
//! 记录 HTTP 方法、路径、处理函数以及按位置索引的参数绑定

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::DispatchError;

/// 类型擦除后的控制器实例
///
/// 适配器为每个控制器只创建一个实例，所有请求共享
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 控制器方法的返回结果
pub type HandlerResult = anyhow::Result<Value>;

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Options,
}

impl HttpMethod {
    /// 小写形式，与路由表、函数清单中的写法一致
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            "options" => Ok(HttpMethod::Options),
            _ => Err(format!("Unsupported HTTP method: {}", s)),
        }
    }
}

/// 参数来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Path,
    Querystring,
    Header,
    Body,
}

/// 请求体解码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// 原样传递
    #[default]
    Raw,
    /// 按 JSON 解析
    Json,
}

impl BodyEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyEncoding::Raw => "raw",
            BodyEncoding::Json => "json",
        }
    }
}

/// 参数绑定
///
/// 对于 `Body` 来源，`name` 同时充当解码方式选择器（`"raw"` 或 `"json"`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub source: ParamSource,
    pub name: String,
}

impl ParameterBinding {
    pub fn new(source: ParamSource, name: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
        }
    }

    pub fn path(name: impl Into<String>) -> Self {
        Self::new(ParamSource::Path, name)
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(ParamSource::Querystring, name)
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self::new(ParamSource::Header, name)
    }

    pub fn body(encoding: BodyEncoding) -> Self {
        Self::new(ParamSource::Body, encoding.as_str())
    }
}

/// 按位置排列的实参列表
///
/// 未绑定或请求中缺失的位置为 `Value::Null`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Value>);

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.0.get(position)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }

    /// 把指定位置的值反序列化为控制器方法的参数类型
    ///
    /// 越界位置按 `Null` 处理，因此 `Option<T>` 参数会得到 `None`。
    /// 路径、查询参数与请求头总是以字符串传入，直接解码失败时再把字符串
    /// 当作 JSON 文本解析一次，使 `u32`、`bool` 等类型可以直接使用
    pub fn decode<T: DeserializeOwned>(&self, position: usize) -> Result<T, DispatchError> {
        let value = self.0.get(position).cloned().unwrap_or(Value::Null);
        let text = match &value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        };

        serde_json::from_value(value).or_else(|source| {
            text.and_then(|s| serde_json::from_str(&s).ok())
                .ok_or(DispatchError::ArgumentDecode { position, source })
        })
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

type ErasedCall = dyn Fn(Instance, Arguments) -> Result<BoxFuture<'static, HandlerResult>, DispatchError>
    + Send
    + Sync;

/// 处理函数
///
/// 固定调用约定：按位置排列的实参进，单个 JSON 值或错误出
#[derive(Clone)]
pub struct Handle {
    controller: &'static str,
    call: Arc<ErasedCall>,
}

impl Handle {
    /// 从一个接收控制器实例的闭包创建处理函数
    ///
    /// ```ignore
    /// Handle::new(|this: Arc<UserController>, args: Arguments| async move {
    ///     let id: String = args.decode(0)?;
    ///     Ok(serde_json::to_value(this.get_user(id))?)
    /// })
    /// ```
    pub fn new<C, F, Fut>(f: F) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let controller = std::any::type_name::<C>();
        let call = move |instance: Instance,
                         args: Arguments|
              -> Result<BoxFuture<'static, HandlerResult>, DispatchError> {
            let this = instance
                .downcast::<C>()
                .map_err(|_| DispatchError::InstanceMismatch {
                    expected: controller,
                })?;
            let fut: BoxFuture<'static, HandlerResult> = Box::pin(f(this, args));
            Ok(fut)
        };

        Self {
            controller,
            call: Arc::new(call),
        }
    }

    /// 处理函数所属的控制器类型
    pub fn controller(&self) -> &'static str {
        self.controller
    }

    pub fn invoke(
        &self,
        instance: Instance,
        args: Arguments,
    ) -> Result<BoxFuture<'static, HandlerResult>, DispatchError> {
        (self.call)(instance, args)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

/// 路由条目
///
/// 各字段相互独立、均可缺省；只有方法、路径和处理函数齐全时才会被适配器绑定
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteEntry {
    #[serde(rename = "method", skip_serializing_if = "Option::is_none")]
    pub http_method: Option<HttpMethod>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip)]
    pub handle: Option<Handle>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<usize, ParameterBinding>>,
}

impl RouteEntry {
    /// 方法、路径、处理函数是否齐全
    pub fn is_bindable(&self) -> bool {
        self.http_method.is_some() && self.path.is_some() && self.handle.is_some()
    }

    /// 调用参数个数：最大绑定位置 + 1，在 `usize::MAX` 处饱和
    pub fn arity(&self) -> usize {
        self.parameters
            .as_ref()
            .and_then(|params| params.keys().next_back())
            .map(|position| position.saturating_add(1))
            .unwrap_or(0)
    }

    pub fn parameter(&self, position: usize) -> Option<&ParameterBinding> {
        self.parameters.as_ref()?.get(&position)
    }
}

/// 单个控制器的路由表
///
/// 迭代顺序为方法第一次被标注的顺序
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RouteTable {
    entries: IndexMap<String, RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取或创建某个方法的条目
    pub fn entry_mut(&mut self, property_key: &str) -> &mut RouteEntry {
        self.entries.entry(property_key.to_string()).or_default()
    }

    pub fn get(&self, property_key: &str) -> Option<&RouteEntry> {
        self.entries.get(property_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
