//! 配置常量定义
//!
//! 定义所有 Hexagon 使用的配置键名称与默认值

/// 环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "HEXAGON_";

/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "hexagon.toml";

// ==================== Server 配置 ====================

/// 服务器监听地址
pub const SERVER_HOST: &str = "server.host";

/// 服务器监听端口
pub const SERVER_PORT: &str = "server.port";

/// 是否启用请求日志
pub const SERVER_ENABLE_REQUEST_LOGGING: &str = "server.enable-request-logging";

// ==================== Codegen 配置 ====================

/// 生成文件的输出目录
pub const CODEGEN_OUTPUT_DIR: &str = "hexagon.codegen.output-dir";

/// 无服务器平台名称，用于选择模板 `handler-<provider>-rest.tera`
pub const CODEGEN_PROVIDER: &str = "hexagon.codegen.provider";

/// 生成文件的扩展名
pub const CODEGEN_EXTENSION: &str = "hexagon.codegen.extension";

/// 自定义模板目录
pub const CODEGEN_TEMPLATE_DIR: &str = "hexagon.codegen.template-dir";

/// 控制器与源文件的对应关系（表数组）
pub const CODEGEN_CONTROLLERS: &str = "hexagon.codegen.controllers";

pub const DEFAULT_CODEGEN_OUTPUT_DIR: &str = ".hexagon";
pub const DEFAULT_CODEGEN_PROVIDER: &str = "aws";
pub const DEFAULT_CODEGEN_EXTENSION: &str = "rs";

// ==================== Logging 配置 ====================

/// 日志级别：trace / debug / info / warn / error
pub const LOGGING_LEVEL: &str = "logging.level";

/// 日志格式：compact / full / json / pretty
pub const LOGGING_FORMAT: &str = "logging.format";

/// 自定义过滤器，语法同 `RUST_LOG`
pub const LOGGING_FILTER: &str = "logging.filter";
