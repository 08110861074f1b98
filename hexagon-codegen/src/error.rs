//! 代码生成错误

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    /// 读写文件失败
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 没有可用于该平台的模板
    #[error("No handler template for provider '{0}'")]
    TemplateNotFound(String),

    /// 模板解析或渲染失败
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// 函数清单序列化失败
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl CodegenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodegenError::Io {
            path: path.into(),
            source,
        }
    }
}
