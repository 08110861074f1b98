//! 用户控制器
//!
//! 通过 `#[rest_controller]` 声明路由，启动时由 inventory 自动注册

use anyhow::bail;
use hexagon_macros::rest_controller;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct UserController;

#[rest_controller]
impl UserController {
    /// 按名称搜索，未指定时返回全部
    #[get_mapping("/users")]
    pub fn get_users(&self, #[query_param("search")] search: Option<String>) -> Vec<User> {
        match search {
            Some(name) if !name.is_empty() => vec![User::new("1", name)],
            _ => vec![User::new("2", "all")],
        }
    }

    #[get_mapping("/users/:id")]
    pub async fn get_user(&self, #[path_param("id")] id: String) -> User {
        User::new(id, "test")
    }

    #[post_mapping("/users")]
    pub async fn create_update_user(&self, #[body(json)] user: User) -> anyhow::Result<User> {
        if user.name.trim().is_empty() {
            bail!("user name is required");
        }
        Ok(User::new("new-id", user.name))
    }

    /// 分页列出用户，页码从 1 开始
    #[get_mapping("/pages/:page")]
    pub fn get_page(
        &self,
        #[path_param("page")] page: u32,
        #[query_param("size")] size: Option<u32>,
    ) -> Vec<User> {
        let size = size.unwrap_or(2);
        let start = page.saturating_sub(1) * size;
        (start..start + size)
            .map(|n| User::new(n.to_string(), format!("user-{}", n)))
            .collect()
    }

    #[get_mapping("/info")]
    pub fn get_info(&self, #[header_param("content-type")] content_type: Option<String>) -> Option<String> {
        content_type
    }
}
