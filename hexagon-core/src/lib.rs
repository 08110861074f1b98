// hexagon-core: REST 控制器的路由元数据与分发核心
//
// 提供与具体 Web 框架无关的基础能力：
// - 控制器注册表与每个控制器的路由表
// - 声明路由与参数绑定的标注 API
// - 按位置解析请求参数并调用处理函数的分发器
// - 遍历注册表并交给适配器的绑定流程

pub mod annotation;
pub mod binding;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod registry;
pub mod request;

// 重新导出常用类型
pub use annotation::ControllerMetadata;
pub use binding::{bind_routes, BindReport, RouteSink};
pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use constants::*;
pub use dispatch::Dispatcher;
pub use error::{BindError, DispatchError, Result};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use metadata::{
    Arguments, BodyEncoding, Handle, HandlerResult, HttpMethod, Instance, ParamSource,
    ParameterBinding, RouteEntry, RouteTable,
};
pub use registry::{
    get_all_submissions, get_registry, ControllerDescriptor, ControllerFactory,
    ControllerSubmission, Registry,
};
pub use request::{RequestFacets, ResponseSink, RestRequest, TextResponse};

// 导出 anyhow、inventory 和 serde_json，供宏使用
pub use anyhow;
pub use inventory;
pub use serde_json;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::binding::{bind_routes, RouteSink};
    pub use crate::config::Environment;
    pub use crate::dispatch::Dispatcher;
    pub use crate::error::{BindError, DispatchError, Result};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::metadata::{Arguments, BodyEncoding, Handle, HttpMethod};
    pub use crate::registry::{get_registry, Registry};
    pub use crate::request::{RequestFacets, ResponseSink, RestRequest};
    pub use anyhow::{anyhow, Context};
}
