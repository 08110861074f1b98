//! 适配器绑定
//!
//! 遍历注册表，为每个可绑定的路由条目构建分发器并交给具体框架的路由表。
//! 顺序为“控制器注册顺序，再路由表键顺序”；缺少方法、路径或处理函数的条目被静默跳过。

use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::error::BindError;
use crate::metadata::HttpMethod;
use crate::registry::Registry;

/// 外部框架的路由注册入口
pub trait RouteSink {
    fn add_route(&mut self, method: HttpMethod, path: &str, dispatcher: Dispatcher);
}

/// 绑定结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindReport {
    /// 被实例化的控制器数量
    pub controllers: usize,
    /// 注册的路由数量
    pub routes: usize,
    /// 因声明不完整而跳过的条目数量
    pub skipped: usize,
}

/// 把注册表中的所有路由绑定到 `sink`
///
/// 每个控制器在一次绑定中只实例化一次，实例被它的所有路由共享
pub fn bind_routes<S>(registry: &Registry, sink: &mut S) -> Result<BindReport, BindError>
where
    S: RouteSink + ?Sized,
{
    let mut report = BindReport::default();

    for descriptor in registry.controllers() {
        let Some(table) = registry.route_table_of(descriptor.type_id()) else {
            tracing::debug!("Controller {} has no route metadata", descriptor.name());
            continue;
        };

        let (bindable, incomplete): (Vec<_>, Vec<_>) =
            table.iter().partition(|(_, entry)| entry.is_bindable());

        for (property_key, _) in &incomplete {
            tracing::debug!(
                "Skipping {}::{}: route declaration is incomplete",
                descriptor.name(),
                property_key
            );
        }
        report.skipped += incomplete.len();

        if bindable.is_empty() {
            continue;
        }

        let instance = descriptor
            .instantiate()
            .map_err(|cause| BindError::Instantiation {
                controller: descriptor.type_name(),
                cause,
            })?;
        report.controllers += 1;

        for (property_key, entry) in bindable {
            let (Some(method), Some(path)) = (entry.http_method, entry.path.as_deref()) else {
                continue;
            };

            let dispatcher = Dispatcher::build(entry, Arc::clone(&instance))?;
            sink.add_route(method, path, dispatcher);
            report.routes += 1;

            tracing::info!(
                "✅ Mapped {} {} -> {}::{}",
                method,
                path,
                descriptor.name(),
                property_key
            );
        }
    }

    Ok(report)
}

impl RouteSink for Vec<(HttpMethod, String, Dispatcher)> {
    fn add_route(&mut self, method: HttpMethod, path: &str, dispatcher: Dispatcher) {
        self.push((method, path.to_string(), dispatcher));
    }
}
