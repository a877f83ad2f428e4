//! Build script for spyt.
//!
//! Copies the `.env.example` template to the local data directory, next to the
//! `.env` file spyt reads at startup, so users find a ready-to-fill template:
//!
//! - Linux: `~/.local/share/spyt/.env.example`
//! - macOS: `~/Library/Application Support/spyt/.env.example`
//! - Windows: `%LOCALAPPDATA%/spyt/.env.example`
//!
//! Nothing here is needed to compile the crate, so every failure is reported as a
//! cargo warning instead of failing the build (read-only home directories in CI,
//! sandboxed builds).

use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=.env.example");

    if let Err(e) = copy_env_template() {
        println!("cargo:warning=could not install .env.example: {}", e);
    }
}

fn copy_env_template() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");
    if !env_example_path.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
        return Ok(());
    }

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spyt");
    fs::create_dir_all(&out_dir)?;

    let contents = fs::read_to_string(&env_example_path)?;
    fs::write(out_dir.join(".env.example"), contents)?;
    Ok(())
}
