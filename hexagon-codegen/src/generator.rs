//! 无服务器处理函数生成器
//!
//! 对每个已配置源文件的控制器，为它的每个路由渲染一个处理函数源文件，
//! 并在函数清单中登记对应的 HTTP 事件

use hexagon_core::Registry;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tera::{Context, Tera};

use crate::error::CodegenError;
use crate::manifest::{FunctionDefinition, FunctionManifest};
use crate::settings::GeneratorSettings;

/// 内置的 AWS 处理函数模板
const BUILTIN_AWS_TEMPLATE: &str = include_str!("../templates/handler-aws-rest.tera");

pub struct ServerlessGenerator {
    settings: GeneratorSettings,
    tera: Tera,
    template_name: String,
}

impl ServerlessGenerator {
    /// 创建生成器并加载 `handler-<provider>-rest.tera` 模板
    pub fn new(settings: GeneratorSettings) -> Result<Self, CodegenError> {
        let template_name = settings.template_name();
        let source = load_template(&settings, &template_name)?;

        let mut tera = Tera::default();
        tera.add_raw_template(&template_name, &source)?;

        Ok(Self {
            settings,
            tera,
            template_name,
        })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// 生成所有处理函数，返回新的函数清单
    pub fn generate(&self, registry: &Registry) -> Result<FunctionManifest, CodegenError> {
        let mut manifest = FunctionManifest::new();
        self.generate_into(registry, &mut manifest)?;
        Ok(manifest)
    }

    /// 生成所有处理函数并合并到已有清单，返回生成的文件数量
    pub fn generate_into(
        &self,
        registry: &Registry,
        manifest: &mut FunctionManifest,
    ) -> Result<usize, CodegenError> {
        let output_dir = &self.settings.output_dir;
        fs::create_dir_all(output_dir).map_err(|e| CodegenError::io(output_dir, e))?;

        let cwd = std::env::current_dir().map_err(|e| CodegenError::io(".", e))?;
        let mut generated = 0;

        for descriptor in registry.controllers() {
            let name = descriptor.name();
            let table = registry.route_table_of(descriptor.type_id());
            let (Some(table), Some(config)) = (table, self.settings.controller(name)) else {
                tracing::warn!("⚠️ cannot find rest metadata for {}", name);
                continue;
            };

            let module_import = module_import(&cwd.join(output_dir), &cwd.join(&config.file));

            for (property_key, entry) in table.iter() {
                let (Some(method), Some(path)) = (entry.http_method, entry.path.as_deref()) else {
                    tracing::debug!(
                        "Skipping {}::{}: no method or path declared",
                        name,
                        property_key
                    );
                    continue;
                };

                let function_name = format!("{}_{}", name, property_key);

                let mut context = Context::new();
                context.insert("controller", name);
                context.insert("moduleImport", &module_import);
                context.insert("propertyKey", property_key);
                context.insert("restMethod", entry);
                let code = self.tera.render(&self.template_name, &context)?;

                let file = output_dir.join(format!("{}.{}", function_name, self.settings.extension));
                fs::write(&file, code).map_err(|e| CodegenError::io(&file, e))?;

                let handler = format!("{}/{}.main", slashed(output_dir), function_name);
                manifest.insert(
                    function_name.as_str(),
                    FunctionDefinition::http(handler, method, path),
                );

                tracing::info!("📝 Generated {} {} -> {}", method, path, file.display());
                generated += 1;
            }
        }

        tracing::info!(
            "✅ Serverless generation completed: {} handlers in {}",
            generated,
            output_dir.display()
        );

        Ok(generated)
    }
}

fn load_template(settings: &GeneratorSettings, template_name: &str) -> Result<String, CodegenError> {
    if let Some(dir) = &settings.template_dir {
        let path = dir.join(template_name);
        if path.is_file() {
            tracing::debug!("Using handler template {:?}", path);
            return fs::read_to_string(&path).map_err(|e| CodegenError::io(&path, e));
        }
        tracing::debug!("Template {:?} not found, trying built-in templates", path);
    }

    match settings.provider.as_str() {
        "aws" => Ok(BUILTIN_AWS_TEMPLATE.to_string()),
        other => Err(CodegenError::TemplateNotFound(other.to_string())),
    }
}

/// 控制器源文件相对于输出目录的路径，去掉扩展名
fn module_import(output_dir: &Path, file: &Path) -> String {
    slashed(&relative_path(output_dir, &file.with_extension("")))
}

/// 计算从目录 `from` 到 `to` 的相对路径，两者须同为绝对路径或同为相对路径
fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(from);
    let to = normalize(to);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut result = PathBuf::new();
    for _ in common..from.len() {
        result.push("..");
    }
    for component in &to[common..] {
        result.push(component.as_os_str());
    }
    result
}

fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(components.last(), Some(Component::Normal(_))) => {
                components.pop();
            }
            other => components.push(other),
        }
    }
    components
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
