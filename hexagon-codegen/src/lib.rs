//! # Hexagon Codegen
//!
//! 构建期适配器：为注册表中的每个 REST 路由生成一个无服务器处理函数源文件，
//! 并维护对应的函数清单
//!
//! ```ignore
//! let env = Environment::load(DEFAULT_CONFIG_FILE)?;
//! let generator = ServerlessGenerator::new(GeneratorSettings::from_environment(&env))?;
//! let manifest = generator.generate(get_registry())?;
//! manifest.write_json(".hexagon/functions.json")?;
//! ```

pub mod error;
pub mod generator;
pub mod manifest;
pub mod settings;

pub use error::CodegenError;
pub use generator::ServerlessGenerator;
pub use manifest::{FunctionDefinition, FunctionEvent, FunctionManifest, HttpEvent};
pub use settings::{ControllerConfig, GeneratorSettings};
