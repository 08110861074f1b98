//! 控制器注册表
//!
//! 注册表持有两部分内容：
//!
//! - 按注册顺序排列的控制器描述（[`ControllerDescriptor`]）
//! - 以控制器类型为键的路由表（[`RouteTable`]），多次标注会累积到同一张表上
//!
//! 注册表只在启动阶段通过 `&mut Registry` 修改，之后只读共享。
//! 进程级注册表通过 inventory 收集的 [`ControllerSubmission`] 在首次访问时构建。

use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::metadata::{Instance, RouteEntry, RouteTable};

/// 控制器工厂
///
/// 由适配器在绑定时调用，每次适配器运行只调用一次
pub type ControllerFactory = Arc<dyn Fn() -> anyhow::Result<Instance> + Send + Sync>;

/// 控制器描述
#[derive(Clone)]
pub struct ControllerDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    factory: ControllerFactory,
}

impl ControllerDescriptor {
    pub fn new<C: Any + Send + Sync>(factory: ControllerFactory) -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
            factory,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// 完整类型路径，例如 `user_demo::controller::UserController`
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 控制器短名称，例如 `UserController`
    pub fn name(&self) -> &'static str {
        self.type_name.rsplit("::").next().unwrap_or(self.type_name)
    }

    /// 创建控制器实例
    pub fn instantiate(&self) -> anyhow::Result<Instance> {
        (self.factory)()
    }
}

impl fmt::Debug for ControllerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDescriptor")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// 控制器提交信息
///
/// `#[rest_controller]` 宏为每个控制器生成一个提交，`register` 负责注册控制器并写入路由表
pub struct ControllerSubmission {
    pub name: &'static str,
    pub register: fn(&mut Registry),
}

inventory::collect!(ControllerSubmission);

/// 获取所有提交的控制器
pub fn get_all_submissions() -> impl Iterator<Item = &'static ControllerSubmission> {
    inventory::iter::<ControllerSubmission>.into_iter()
}

/// 进程级注册表
static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::from_submissions);

/// 获取进程级注册表
///
/// 首次调用时从 inventory 构建，之后始终返回同一个实例
pub fn get_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// 注册表
#[derive(Debug, Default)]
pub struct Registry {
    controllers: Vec<ControllerDescriptor>,
    metadata: HashMap<TypeId, RouteTable>,
}

impl Registry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 inventory 中收集的提交构建注册表
    ///
    /// 控制器顺序取决于 inventory 的链接顺序，不保证与声明顺序一致；
    /// 需要固定顺序时应使用 [`Registry::new`] 显式注册
    pub fn from_submissions() -> Self {
        let mut registry = Self::new();

        tracing::info!("🔍 Discovering rest controllers from inventory...");

        for submission in get_all_submissions() {
            (submission.register)(&mut registry);
            tracing::debug!("Collected controller submission: {}", submission.name);
        }

        tracing::info!(
            "✅ Controller discovery completed: {} controllers registered",
            registry.controllers.len()
        );

        registry
    }

    /// 以默认构造注册控制器
    ///
    /// 返回 `false` 表示该类型已经注册过，本次调用被忽略
    pub fn register_controller<C>(&mut self) -> bool
    where
        C: Default + Send + Sync + 'static,
    {
        self.register_controller_with(|| Ok(C::default()))
    }

    /// 以自定义工厂注册控制器
    pub fn register_controller_with<C, F>(&mut self, factory: F) -> bool
    where
        C: Send + Sync + 'static,
        F: Fn() -> anyhow::Result<C> + Send + Sync + 'static,
    {
        let factory: ControllerFactory = Arc::new(move || {
            let instance: Instance = Arc::new(factory()?);
            Ok(instance)
        });
        self.register_descriptor(ControllerDescriptor::new::<C>(factory))
    }

    /// 追加控制器描述
    pub fn register_descriptor(&mut self, descriptor: ControllerDescriptor) -> bool {
        if self.is_registered_id(descriptor.type_id()) {
            tracing::warn!(
                "Controller {} is already registered, ignoring duplicate registration",
                descriptor.type_name()
            );
            return false;
        }

        tracing::debug!("Registering controller: {}", descriptor.type_name());
        self.controllers.push(descriptor);
        true
    }

    pub fn is_registered<C: 'static>(&self) -> bool {
        self.is_registered_id(TypeId::of::<C>())
    }

    fn is_registered_id(&self, type_id: TypeId) -> bool {
        self.controllers.iter().any(|c| c.type_id() == type_id)
    }

    /// 所有控制器，按注册顺序
    pub fn controllers(&self) -> &[ControllerDescriptor] {
        &self.controllers
    }

    /// 查找控制器描述
    pub fn controller_by_name(&self, name: &str) -> Option<&ControllerDescriptor> {
        self.controllers.iter().find(|c| c.name() == name)
    }

    /// 控制器的路由表
    pub fn route_table<C: 'static>(&self) -> Option<&RouteTable> {
        self.route_table_of(TypeId::of::<C>())
    }

    pub fn route_table_of(&self, type_id: TypeId) -> Option<&RouteTable> {
        self.metadata.get(&type_id)
    }

    /// 读取或创建路由表，仅供标注 API 使用
    pub(crate) fn route_table_mut<C: 'static>(&mut self) -> &mut RouteTable {
        self.metadata.entry(TypeId::of::<C>()).or_default()
    }

    /// 按“控制器注册顺序，再路由表键顺序”枚举所有路由条目
    pub fn routes(&self) -> impl Iterator<Item = (&ControllerDescriptor, &str, &RouteEntry)> {
        self.controllers.iter().flat_map(move |descriptor| {
            self.route_table_of(descriptor.type_id())
                .into_iter()
                .flat_map(move |table| {
                    table
                        .iter()
                        .map(move |(key, entry)| (descriptor, key, entry))
                })
        })
    }
}
