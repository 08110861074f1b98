//! Hexagon Macros
//!
//! 声明 REST 控制器的过程宏，展开为 `hexagon_core` 标注 API 的调用

mod controller;
mod route;
mod utils;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemImpl};

/// 声明一个 REST 控制器
///
/// 放在控制器的 `impl` 块上。带有路由标记的方法被注册为路由，
/// 参数上的标记声明实参从请求的哪一部分获取：
///
/// | 标记 | 含义 |
/// |------|------|
/// | `#[get_mapping("/path")]` 等 | 路由方法与路径，另有 `post_mapping` / `put_mapping` / `delete_mapping` / `options_mapping` |
/// | `#[path_param("id")]` | 路径参数，省略名称时使用参数名 |
/// | `#[query_param("q")]` | 查询参数 |
/// | `#[header_param("x-id")]` | 请求头 |
/// | `#[body]` / `#[body(raw)]` | 原始请求体 |
/// | `#[body(json)]` | 按 JSON 解析的请求体 |
///
/// 实参通过 serde 从 JSON 值解码，路径、查询参数与请求头的字符串值
/// 可以解码为数字、布尔等类型；返回值通过 serde 序列化；
/// 返回 `Result` 的方法，其错误作为调用错误向上传播。
///
/// 控制器默认通过 `Default` 构造，也可以指定工厂函数：
/// `#[rest_controller(factory = UserController::create)]`，
/// 工厂签名为 `fn() -> anyhow::Result<Self>`。
///
/// # 示例
///
/// ```ignore
/// #[derive(Default)]
/// struct UserController;
///
/// #[rest_controller]
/// impl UserController {
///     #[get_mapping("/users/:id")]
///     async fn get_user(&self, #[path_param("id")] id: String) -> anyhow::Result<User> {
///         // ...
///     }
///
///     #[post_mapping("/users")]
///     async fn save_user(&self, #[body(json)] user: User) -> User {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn rest_controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = parse_macro_input!(attr as controller::ControllerOptions);
    let input = parse_macro_input!(item as ItemImpl);

    controller::expand(options, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
