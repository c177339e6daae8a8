use anyhow::bail;
use minutes_core::config::Config;
use std::path::Path;

pub fn run(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        bail!("{} already exists; not overwriting", path.display());
    }
    Config::default().save(path)?;
    println!("Wrote starter config to {}.", path.display());
    println!("Add sessions there, or let the server mint a token at startup.");
    Ok(())
}
