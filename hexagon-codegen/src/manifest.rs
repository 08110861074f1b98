//! 无服务器函数清单
//!
//! 每个路由对应一个函数条目，格式与 serverless 框架的 `functions` 段一致：
//!
//! ```json
//! {
//!   "UserController_get_user": {
//!     "handler": ".hexagon/UserController_get_user.main",
//!     "events": [{ "http": { "method": "get", "path": "/users/:id" } }]
//!   }
//! }
//! ```

use hexagon_core::HttpMethod;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CodegenError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpEvent {
    pub method: HttpMethod,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEvent {
    pub http: HttpEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub handler: String,
    pub events: Vec<FunctionEvent>,
}

impl FunctionDefinition {
    pub fn http(handler: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            events: vec![FunctionEvent {
                http: HttpEvent {
                    method,
                    path: path.into(),
                },
            }],
        }
    }
}

/// 函数清单，按生成顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionManifest {
    functions: IndexMap<String, FunctionDefinition>,
}

impl FunctionManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入函数条目，同名条目被覆盖
    pub fn insert(&mut self, name: impl Into<String>, definition: FunctionDefinition) {
        self.functions.insert(name.into(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionDefinition)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> Result<String, CodegenError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CodegenError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|e| CodegenError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manifest_json_shape() {
        let mut manifest = FunctionManifest::new();
        manifest.insert(
            "UserController_get_user",
            FunctionDefinition::http(
                ".hexagon/UserController_get_user.main",
                HttpMethod::Get,
                "/users/:id",
            ),
        );

        let value: serde_json::Value =
            serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "UserController_get_user": {
                    "handler": ".hexagon/UserController_get_user.main",
                    "events": [{ "http": { "method": "get", "path": "/users/:id" } }]
                }
            })
        );
    }
}
