//! Web 服务器模块
//!
//! 基于 Axum 的 Web 服务器实现

use axum::Router;
use hexagon_core::prelude::*;
use hexagon_core::{SERVER_ENABLE_REQUEST_LOGGING, SERVER_HOST, SERVER_PORT};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::adapter::build_router;
use crate::error::WebError;

/// Web 服务器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProperties {
    /// 服务器监听地址
    pub host: String,

    /// 服务器监听端口
    pub port: u16,

    /// 是否启用请求日志
    pub enable_request_logging: bool,
}

impl Default for ServerProperties {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_request_logging: true,
        }
    }
}

impl ServerProperties {
    /// 从 Environment 加载配置
    pub fn from_environment(env: &Environment) -> Self {
        let defaults = Self::default();
        Self {
            host: env.get_string(SERVER_HOST).unwrap_or(defaults.host),
            port: env
                .get_i64(SERVER_PORT)
                .and_then(|port| u16::try_from(port).ok())
                .unwrap_or(defaults.port),
            enable_request_logging: env
                .get_bool(SERVER_ENABLE_REQUEST_LOGGING)
                .unwrap_or(defaults.enable_request_logging),
        }
    }

    /// 获取服务器地址
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Hexagon Web 服务器
pub struct HexagonWebServer {
    config: ServerProperties,
    router: Router,
}

impl HexagonWebServer {
    /// 用注册表中的控制器创建服务器
    pub fn new(config: ServerProperties, registry: &Registry) -> Result<Self, WebError> {
        let router = build_router(registry)?;
        Ok(Self { config, router })
    }

    /// 使用进程级注册表
    pub fn from_global_registry(config: ServerProperties) -> Result<Self, WebError> {
        Self::new(config, get_registry())
    }

    pub fn config(&self) -> &ServerProperties {
        &self.config
    }

    /// 获取完整路由（包含请求日志层）
    pub fn router(&self) -> Router {
        if self.config.enable_request_logging {
            self.router.clone().layer(TraceLayer::new_for_http())
        } else {
            self.router.clone()
        }
    }

    /// 启动服务器
    pub async fn run(self) -> Result<(), WebError> {
        let addr = self.config.address();
        let app = self.router();

        tracing::info!("🚀 Starting Hexagon Web Server on {}", addr);

        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("✅ Server listening on http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
