use anyhow::Context;
use minutes_core::config::Config;
use std::path::Path;

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = if config_path.exists() {
        Config::load(config_path)
            .with_context(|| format!("could not read config at {}", config_path.display()))?
    } else {
        tracing::warn!(
            "no config at {}; starting with defaults",
            config_path.display()
        );
        Config::default()
    };

    minutes_server::serve(config).await
}
