use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use xenolexia_config::Config;

const MAIN_PROFILE: &str = "main";

/// Root of everything the app writes: profiles and store snapshots.
///
/// `--data-dir` wins, then `XENOLEXIA_DATA_DIR`, then the platform data dir.
pub fn data_root(override_dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os("XENOLEXIA_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("xenolexia"))
        .context("no platform data directory; pass --data-dir")
}

fn profiles_dir(root: &Path) -> PathBuf {
    root.join("profiles")
}

fn profile_path(root: &Path, name: &str) -> PathBuf {
    profiles_dir(root).join(format!("{name}.json"))
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("malformed profile {}", path.display()))?;
    Ok(profile.value)
}

fn write_profile(path: &Path, profile: &Profile) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(profile)?)
        .with_context(|| format!("failed to write profile {}", path.display()))
}

/// Create the profile folder and the main profile if missing
pub fn init_user_config(root: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(profiles_dir(root))?;

    let main_profile = profile_path(root, MAIN_PROFILE);
    if !main_profile.exists() {
        let profile = Profile {
            name: MAIN_PROFILE.into(),
            value: Config::default(),
        };
        write_profile(&main_profile, &profile)?;
        tracing::info!("Created main profile at {}", main_profile.display());
    }

    Ok(())
}

/// Load a profile by name, falling back to main, then to defaults
pub fn load_user_profile(root: &Path, name: &str) -> anyhow::Result<Config> {
    let profile_file = profile_path(root, name);
    if profile_file.exists() {
        return read_profile(&profile_file);
    }

    tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
    let main_file = profile_path(root, MAIN_PROFILE);
    if main_file.exists() {
        read_profile(&main_file)
    } else {
        Ok(Config::default())
    }
}

/// Add a new profile cloned from main
pub fn add_profile_from_default(root: &Path, new_name: &str) -> anyhow::Result<PathBuf> {
    let file = profile_path(root, new_name);
    if file.exists() {
        anyhow::bail!("profile {new_name} already exists");
    }

    let profile = Profile {
        name: new_name.into(),
        value: load_user_profile(root, MAIN_PROFILE)?,
    };
    write_profile(&file, &profile)?;
    tracing::info!("Created new profile: {new_name}");
    Ok(file)
}
