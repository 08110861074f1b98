//! 标注 API
//!
//! 以显式的构建器代替装饰器：每次调用都是对控制器路由表的一次读-改-写。
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register_controller::<UserController>();
//! registry
//!     .annotate::<UserController>()
//!     .get("get_user", "/users/:id", Handle::new(|this: Arc<UserController>, args| async move {
//!         let id: String = args.decode(0)?;
//!         Ok(serde_json::to_value(this.get_user(id))?)
//!     }))
//!     .path_param("get_user", 0, "id");
//! ```
//!
//! 标注不做任何校验，空路径等输入原样记录。

use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::metadata::{BodyEncoding, Handle, HttpMethod, ParameterBinding, RouteEntry};
use crate::registry::Registry;

/// 单个控制器的元数据构建器
pub struct ControllerMetadata<'r, C> {
    registry: &'r mut Registry,
    _controller: PhantomData<fn() -> C>,
}

impl Registry {
    /// 获取控制器 `C` 的元数据构建器
    pub fn annotate<C: Send + Sync + 'static>(&mut self) -> ControllerMetadata<'_, C> {
        ControllerMetadata {
            registry: self,
            _controller: PhantomData,
        }
    }
}

impl<'r, C: Send + Sync + 'static> ControllerMetadata<'r, C> {
    fn entry(&mut self, property_key: &str) -> &mut RouteEntry {
        self.registry.route_table_mut::<C>().entry_mut(property_key)
    }

    /// 路由标注：覆盖方法、路径与处理函数，保留已有参数绑定
    pub fn route(
        &mut self,
        property_key: &str,
        method: HttpMethod,
        path: impl Into<String>,
        handle: Handle,
    ) -> &mut Self {
        let path = path.into();
        tracing::debug!(
            "Mapping {}::{} -> {} {}",
            std::any::type_name::<C>(),
            property_key,
            method,
            path
        );

        debug_assert_eq!(
            handle.controller(),
            std::any::type_name::<C>(),
            "handle for {} was built for another controller",
            property_key
        );

        let entry = self.entry(property_key);
        entry.http_method = Some(method);
        entry.path = Some(path);
        entry.handle = Some(handle);
        self
    }

    pub fn get(&mut self, property_key: &str, path: impl Into<String>, handle: Handle) -> &mut Self {
        self.route(property_key, HttpMethod::Get, path, handle)
    }

    pub fn post(&mut self, property_key: &str, path: impl Into<String>, handle: Handle) -> &mut Self {
        self.route(property_key, HttpMethod::Post, path, handle)
    }

    pub fn put(&mut self, property_key: &str, path: impl Into<String>, handle: Handle) -> &mut Self {
        self.route(property_key, HttpMethod::Put, path, handle)
    }

    pub fn delete(&mut self, property_key: &str, path: impl Into<String>, handle: Handle) -> &mut Self {
        self.route(property_key, HttpMethod::Delete, path, handle)
    }

    pub fn options(&mut self, property_key: &str, path: impl Into<String>, handle: Handle) -> &mut Self {
        self.route(property_key, HttpMethod::Options, path, handle)
    }

    /// 参数标注：只覆盖指定位置
    pub fn parameter(
        &mut self,
        property_key: &str,
        position: usize,
        binding: ParameterBinding,
    ) -> &mut Self {
        self.entry(property_key)
            .parameters
            .get_or_insert_with(BTreeMap::new)
            .insert(position, binding);
        self
    }

    pub fn path_param(&mut self, property_key: &str, position: usize, name: impl Into<String>) -> &mut Self {
        self.parameter(property_key, position, ParameterBinding::path(name))
    }

    pub fn query_param(&mut self, property_key: &str, position: usize, name: impl Into<String>) -> &mut Self {
        self.parameter(property_key, position, ParameterBinding::query(name))
    }

    pub fn header_param(&mut self, property_key: &str, position: usize, name: impl Into<String>) -> &mut Self {
        self.parameter(property_key, position, ParameterBinding::header(name))
    }

    pub fn body(&mut self, property_key: &str, position: usize, encoding: BodyEncoding) -> &mut Self {
        self.parameter(property_key, position, ParameterBinding::body(encoding))
    }

    /// 未指定解码方式时默认原样传递
    pub fn body_raw(&mut self, property_key: &str, position: usize) -> &mut Self {
        self.body(property_key, position, BodyEncoding::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Arguments, ParamSource};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[derive(Default)]
    struct Foo;

    #[derive(Default)]
    struct Bar;

    fn handle_for<C: Send + Sync + 'static>() -> Handle {
        Handle::new(|_: Arc<C>, _: Arguments| async { Ok::<_, anyhow::Error>(Value::Null) })
    }

    #[test]
    fn test_route_markers_record_method_and_path() {
        let mut registry = Registry::new();
        registry
            .annotate::<Foo>()
            .get("propkey1", "path-value", handle_for::<Foo>())
            .post("propkey2", "path-value", handle_for::<Foo>())
            .put("propkey3", "path-value", handle_for::<Foo>())
            .delete("propkey4", "path-value", handle_for::<Foo>())
            .options("propkey5", "", handle_for::<Foo>());

        let table = registry.route_table::<Foo>().unwrap();
        let methods: Vec<_> = table
            .iter()
            .map(|(key, entry)| (key, entry.http_method.unwrap()))
            .collect();
        assert_eq!(
            methods,
            vec![
                ("propkey1", HttpMethod::Get),
                ("propkey2", HttpMethod::Post),
                ("propkey3", HttpMethod::Put),
                ("propkey4", HttpMethod::Delete),
                ("propkey5", HttpMethod::Options),
            ]
        );
        assert_eq!(table.get("propkey5").unwrap().path.as_deref(), Some(""));
        assert!(table.iter().all(|(_, entry)| entry.is_bindable()));
    }

    #[test]
    fn test_parameter_order_does_not_matter() {
        let mut forward = Registry::new();
        forward
            .annotate::<Foo>()
            .path_param("m", 0, "id")
            .query_param("m", 1, "search")
            .header_param("m", 2, "content-type")
            .body("m", 3, BodyEncoding::Json);

        let mut backward = Registry::new();
        backward
            .annotate::<Foo>()
            .body("m", 3, BodyEncoding::Json)
            .header_param("m", 2, "content-type")
            .query_param("m", 1, "search")
            .path_param("m", 0, "id");

        let a = forward.route_table::<Foo>().unwrap().get("m").unwrap();
        let b = backward.route_table::<Foo>().unwrap().get("m").unwrap();
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.parameters.as_ref().unwrap().len(), 4);
        assert_eq!(a.parameter(1), Some(&ParameterBinding::query("search")));
    }

    #[test]
    fn test_parameter_only_entry_is_not_bindable() {
        let mut registry = Registry::new();
        registry.annotate::<Foo>().path_param("propkey1", 0, "paramName-value");

        let entry = registry.route_table::<Foo>().unwrap().get("propkey1").unwrap();
        assert!(!entry.is_bindable());
        assert!(entry.http_method.is_none());
        assert_eq!(entry.parameter(0).unwrap().source, ParamSource::Path);
    }

    fn tagged(tag: &'static str) -> Handle {
        Handle::new(move |_: Arc<Foo>, _: Arguments| async move {
            Ok::<_, anyhow::Error>(json!(tag))
        })
    }

    #[tokio::test]
    async fn test_reapplying_route_keeps_parameters() {
        let mut registry = Registry::new();
        registry
            .annotate::<Foo>()
            .get("m", "/old", tagged("first"))
            .path_param("m", 0, "id")
            .post("m", "/new", tagged("second"));

        let table = registry.route_table::<Foo>().unwrap();
        assert_eq!(table.len(), 1);

        let entry = table.get("m").unwrap();
        assert_eq!(entry.http_method, Some(HttpMethod::Post));
        assert_eq!(entry.path.as_deref(), Some("/new"));
        assert_eq!(entry.parameter(0), Some(&ParameterBinding::path("id")));

        let handle = entry.handle.as_ref().unwrap();
        let value = handle
            .invoke(Arc::new(Foo), Arguments::default())
            .unwrap()
            .await
            .unwrap();
        assert_eq!(value, json!("second"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "built for another controller")]
    fn test_handle_of_another_controller_is_rejected() {
        let mut registry = Registry::new();
        registry.annotate::<Foo>().get("m", "/m", handle_for::<Bar>());
    }

    #[test]
    fn test_reapplying_parameter_overwrites_single_slot() {
        let mut registry = Registry::new();
        registry
            .annotate::<Foo>()
            .path_param("m", 0, "id")
            .query_param("m", 1, "page")
            .header_param("m", 0, "x-id");

        let entry = registry.route_table::<Foo>().unwrap().get("m").unwrap();
        assert_eq!(entry.parameter(0), Some(&ParameterBinding::header("x-id")));
        assert_eq!(entry.parameter(1), Some(&ParameterBinding::query("page")));
    }

    #[test]
    fn test_body_defaults_to_raw() {
        let mut registry = Registry::new();
        registry.annotate::<Foo>().body_raw("m", 0).body("m", 1, BodyEncoding::Json);

        let entry = registry.route_table::<Foo>().unwrap().get("m").unwrap();
        assert_eq!(entry.parameter(0).unwrap().name, "raw");
        assert_eq!(entry.parameter(1).unwrap().name, "json");
    }

    #[test]
    fn test_tables_are_per_controller() {
        let mut registry = Registry::new();
        registry.annotate::<Foo>().get("list", "/users", handle_for::<Foo>());
        registry
            .annotate::<Bar>()
            .post("list", "/users", handle_for::<Bar>())
            .query_param("list", 0, "q");

        let foo = registry.route_table::<Foo>().unwrap().get("list").unwrap();
        let bar = registry.route_table::<Bar>().unwrap().get("list").unwrap();
        assert_eq!(foo.http_method, Some(HttpMethod::Get));
        assert!(foo.parameters.is_none());
        assert_eq!(bar.http_method, Some(HttpMethod::Post));
        assert_eq!(bar.arity(), 1);
    }
}
