use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn studyplan_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".studyplan"))
}

pub fn ensure_studyplan_home() -> Result<PathBuf> {
    let dir = studyplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_studyplan_home()?.join("config.toml"))
}

pub fn preferences_path() -> Result<PathBuf> {
    Ok(ensure_studyplan_home()?.join("preferences.yaml"))
}

pub fn log_dir() -> Result<PathBuf> {
    let dir = ensure_studyplan_home()?.join("logs");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
