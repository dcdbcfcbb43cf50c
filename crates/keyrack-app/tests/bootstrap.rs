use std::fs;
use std::net::TcpListener;

use anyhow::Result;
use keyrack_app::AppError;
use keyrack_app::bootstrap::{BootstrapDependencies, run_app_with};
use keyrack_config::ConfigLoader;
use tempfile::TempDir;

fn loader_for(dir: &TempDir, document: &str) -> Result<ConfigLoader> {
    let path = dir.path().join("keyrack.yaml");
    fs::write(&path, document)?;
    Ok(ConfigLoader::from_lookup(|_| None).with_path(path))
}

#[test]
fn dependencies_load_channel_seeds() -> Result<()> {
    let dir = TempDir::new()?;
    let loader = loader_for(
        &dir,
        r#"
bind_addr: "127.0.0.1:7979"
channels:
  - id: 1
    name: pool
    key: |
      sk-first-0000aaaa
      sk-second-000bbbb
"#,
    )?;
    let dependencies = BootstrapDependencies::from_loader(&loader)?;
    assert_eq!(dependencies.config().channels.len(), 1);
    assert_eq!(dependencies.config().bind_addr.port(), 7979);
    Ok(())
}

#[test]
fn invalid_documents_surface_config_errors() -> Result<()> {
    let dir = TempDir::new()?;
    let loader = loader_for(&dir, "unexpected_section: true\n")?;
    let result = BootstrapDependencies::from_loader(&loader);
    assert!(matches!(result, Err(AppError::Config { .. })));
    Ok(())
}

#[tokio::test]
async fn public_bind_without_token_is_refused() -> Result<()> {
    let dir = TempDir::new()?;
    let loader = loader_for(&dir, "bind_addr: \"0.0.0.0:7979\"\n")?;
    let result = run_app_with(BootstrapDependencies::from_loader(&loader)?).await;
    assert!(matches!(result, Err(AppError::InvalidConfig { .. })));
    Ok(())
}

#[tokio::test]
async fn occupied_port_is_a_bind_error() -> Result<()> {
    let occupied = TcpListener::bind("127.0.0.1:0")?;
    let addr = occupied.local_addr()?;
    let dir = TempDir::new()?;
    let loader = loader_for(&dir, &format!("bind_addr: \"{addr}\"\n"))?;
    let result = run_app_with(BootstrapDependencies::from_loader(&loader)?).await;
    assert!(matches!(
        result,
        Err(AppError::ApiServer {
            source: keyrack_api::ApiServerError::Bind { .. },
            ..
        })
    ));
    Ok(())
}
