//! 错误类型
//!
//! 库内部的错误分类使用 `thiserror` 定义，控制器方法本身的失败统一用 `anyhow::Error` 承载。
//!
//! # 示例
//!
//! ```rust,ignore
//! use anyhow::{Context, Result};
//!
//! fn load_user(&self, id: &str) -> Result<User> {
//!     self.users.get(id)
//!         .cloned()
//!         .ok_or_else(|| anyhow::anyhow!("user not found"))
//!         .context(format!("Failed to load user '{}'", id))
//! }
//! ```

use thiserror::Error;

pub use anyhow::Result;

/// 分发错误
///
/// 由 [`Dispatcher`](crate::dispatch::Dispatcher) 在构建或调用时产生，
/// 原样传播给调用方，核心不做任何恢复
#[derive(Error, Debug)]
pub enum DispatchError {
    /// 路由条目没有处理函数
    #[error("route entry has no handler")]
    MissingHandle,

    /// JSON 请求体解析失败
    #[error("failed to parse JSON body: {0}")]
    BodyDecode(#[source] serde_json::Error),

    /// 参数无法转换为控制器方法需要的类型
    #[error("argument at position {position} could not be decoded: {source}")]
    ArgumentDecode {
        position: usize,
        #[source]
        source: serde_json::Error,
    },

    /// 控制器实例与处理函数的类型不匹配
    #[error("controller instance is not a `{expected}`")]
    InstanceMismatch { expected: &'static str },

    /// 返回值序列化失败
    #[error("failed to serialize handler result: {0}")]
    Serialize(#[source] serde_json::Error),

    /// 控制器方法自身返回的错误
    #[error(transparent)]
    Invocation(anyhow::Error),
}

impl DispatchError {
    /// 是否属于请求数据解码失败（请求方的问题）
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            DispatchError::BodyDecode(_) | DispatchError::ArgumentDecode { .. }
        )
    }
}

/// 适配器绑定错误
#[derive(Error, Debug)]
pub enum BindError {
    /// 控制器工厂返回错误
    #[error("failed to instantiate controller `{controller}`: {cause}")]
    Instantiation {
        controller: &'static str,
        cause: anyhow::Error,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
