//! 生成器配置

use hexagon_core::{
    Environment, CODEGEN_CONTROLLERS, CODEGEN_EXTENSION, CODEGEN_OUTPUT_DIR, CODEGEN_PROVIDER,
    CODEGEN_TEMPLATE_DIR, DEFAULT_CODEGEN_EXTENSION, DEFAULT_CODEGEN_OUTPUT_DIR,
    DEFAULT_CODEGEN_PROVIDER,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 控制器与其源文件的对应关系
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ControllerConfig {
    /// 控制器短名称，例如 `UserController`
    pub controller_class: String,
    /// 控制器源文件，相对于工作目录
    pub file: PathBuf,
}

impl ControllerConfig {
    pub fn new(controller_class: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            controller_class: controller_class.into(),
            file: file.into(),
        }
    }
}

/// 生成器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// 输出目录（默认 `.hexagon`）
    pub output_dir: PathBuf,

    /// 无服务器平台（默认 `aws`）
    pub provider: String,

    /// 生成文件的扩展名（默认 `rs`）
    pub extension: String,

    /// 自定义模板目录，其中的 `handler-<provider>-rest.tera` 优先于内置模板
    pub template_dir: Option<PathBuf>,

    pub controllers: Vec<ControllerConfig>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_CODEGEN_OUTPUT_DIR),
            provider: DEFAULT_CODEGEN_PROVIDER.to_string(),
            extension: DEFAULT_CODEGEN_EXTENSION.to_string(),
            template_dir: None,
            controllers: Vec::new(),
        }
    }
}

impl GeneratorSettings {
    /// 从 Environment 加载配置
    ///
    /// 缺少 `controller-class` 或 `file` 的控制器条目会被忽略
    pub fn from_environment(env: &Environment) -> Self {
        let controllers = env
            .get_table_array(CODEGEN_CONTROLLERS)
            .into_iter()
            .filter_map(|mut table| {
                let controller_class = table.remove("controller-class");
                let file = table.remove("file");
                match (controller_class, file) {
                    (Some(controller_class), Some(file)) => {
                        Some(ControllerConfig::new(controller_class, file))
                    }
                    _ => {
                        tracing::warn!("⚠️ Ignoring incomplete controller entry in {}", CODEGEN_CONTROLLERS);
                        None
                    }
                }
            })
            .collect();

        Self {
            output_dir: PathBuf::from(env.get_string_or(CODEGEN_OUTPUT_DIR, DEFAULT_CODEGEN_OUTPUT_DIR)),
            provider: env.get_string_or(CODEGEN_PROVIDER, DEFAULT_CODEGEN_PROVIDER),
            extension: env.get_string_or(CODEGEN_EXTENSION, DEFAULT_CODEGEN_EXTENSION),
            template_dir: env.get_string(CODEGEN_TEMPLATE_DIR).map(PathBuf::from),
            controllers,
        }
    }

    /// 模板文件名：`handler-<provider>-rest.tera`
    pub fn template_name(&self) -> String {
        format!("handler-{}-rest.tera", self.provider)
    }

    pub fn controller(&self, name: &str) -> Option<&ControllerConfig> {
        self.controllers.iter().find(|c| c.controller_class == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexagon_core::TomlPropertySource;

    #[test]
    fn test_defaults() {
        let settings = GeneratorSettings::from_environment(&Environment::new());
        assert_eq!(settings, GeneratorSettings::default());
        assert_eq!(settings.template_name(), "handler-aws-rest.tera");
    }

    #[test]
    fn test_from_toml() {
        let source = TomlPropertySource::parse(
            r#"
[hexagon.codegen]
output-dir = "build/handlers"
provider = "gcp"

[[hexagon.codegen.controllers]]
controller-class = "UserController"
file = "src/controller.rs"

[[hexagon.codegen.controllers]]
controller-class = "Broken"
"#,
            "test".to_string(),
        )
        .unwrap();
        let env = Environment::new();
        env.add_property_source(Box::new(source));

        let settings = GeneratorSettings::from_environment(&env);
        assert_eq!(settings.output_dir, PathBuf::from("build/handlers"));
        assert_eq!(settings.extension, "rs");
        assert_eq!(settings.template_name(), "handler-gcp-rest.tera");
        assert_eq!(
            settings.controllers,
            vec![ControllerConfig::new("UserController", "src/controller.rs")]
        );
        assert!(settings.controller("UserController").is_some());
        assert!(settings.controller("Broken").is_none());
    }
}
