use dynamic_config::{ConfigScope, OverrideSpec};
use tracing_subscriber::EnvFilter;

const APP_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <appSettings>
    <add key="greeting" value="hello" />
  </appSettings>
  <connectionStrings>
    <add name="main" connectionString="Server=prod;Database=app" />
  </connectionStrings>
</configuration>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = std::env::temp_dir().join("dynamic-config-demo");
    std::fs::create_dir_all(&dir)?;
    let app_config = dir.join("app.config");
    std::fs::write(&app_config, APP_CONFIG)?;

    let scope = ConfigScope::with_xml("demo", &app_config);
    println!("greeting: {:?}", scope.read_setting("greeting")?);

    {
        let active = OverrideSpec::for_scope(&scope).activate_with_existing_file(|doc| {
            doc.set_app_settings([("greeting", "bonjour")])?
                .set_connection_strings([("main", "Server=localhost;Database=test")])?;
            Ok(())
        })?;

        println!("override file: {}", active.config_file().display());
        println!("greeting: {:?}", scope.read_setting("greeting")?);
        println!("main: {:?}", scope.connection_string("main")?);
    }

    println!("greeting: {:?}", scope.read_setting("greeting")?);
    println!("main: {:?}", scope.connection_string("main")?);

    Ok(())
}
