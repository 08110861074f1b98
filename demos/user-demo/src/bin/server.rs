use hexagon_web::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = Environment::load(DEFAULT_CONFIG_FILE)?;
    LoggingConfig::from_environment(&env).init()?;

    let properties = ServerProperties::from_environment(&env);
    let server = HexagonWebServer::new(properties, user_demo::registry())?;
    server.run().await?;

    Ok(())
}
