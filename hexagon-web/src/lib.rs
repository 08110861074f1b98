//! # Hexagon Web
//!
//! 基于 Axum 的 Hexagon 适配器：把注册表中声明的 REST 路由挂载为 HTTP 服务
//!
//! ```ignore
//! use hexagon_web::prelude::*;
//!
//! let env = Environment::load(DEFAULT_CONFIG_FILE)?;
//! let server = HexagonWebServer::from_global_registry(ServerProperties::from_environment(&env))?;
//! server.run().await?;
//! ```

pub mod adapter;
pub mod error;
pub mod server;

pub use adapter::{build_router, RestRouter};
pub use error::{ErrorResponse, WebError};
pub use server::{HexagonWebServer, ServerProperties};

pub mod prelude {
    //! 预导入模块

    pub use crate::adapter::{build_router, RestRouter};
    pub use crate::error::{ErrorResponse, WebError};
    pub use crate::server::{HexagonWebServer, ServerProperties};

    pub use hexagon_core::prelude::*;
    pub use hexagon_core::DEFAULT_CONFIG_FILE;

    pub use axum;
    pub use axum::Router;
}
