use hexagon_codegen::{GeneratorSettings, ServerlessGenerator};
use hexagon_core::{Environment, LoggingConfig, DEFAULT_CONFIG_FILE};

/// 函数清单文件名，写入输出目录
const MANIFEST_FILE: &str = "functions.json";

fn main() -> anyhow::Result<()> {
    let env = Environment::load(DEFAULT_CONFIG_FILE)?;
    LoggingConfig::from_environment(&env).init()?;

    let generator = ServerlessGenerator::new(GeneratorSettings::from_environment(&env))?;
    let manifest = generator.generate(user_demo::registry())?;

    let manifest_path = generator.settings().output_dir.join(MANIFEST_FILE);
    manifest.write_json(&manifest_path)?;
    tracing::info!("📦 Wrote {} functions to {}", manifest.len(), manifest_path.display());

    Ok(())
}
