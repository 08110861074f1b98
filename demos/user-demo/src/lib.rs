//! Hexagon 示例：用户服务
//!
//! - `server`：以 axum 启动 HTTP 服务
//! - `codegen`：生成无服务器处理函数与函数清单

pub mod controller;
pub mod health;

use hexagon_core::{get_registry, Registry};

/// 进程级注册表，包含本 crate 声明的所有控制器
pub fn registry() -> &'static Registry {
    let registry = get_registry();
    debug_assert!(registry.is_registered::<controller::UserController>());
    registry
}
