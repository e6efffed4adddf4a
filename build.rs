//! Build script for the Spotify Playlist Maker.
//!
//! Copies the `.env.example` configuration template into the user's local data
//! directory, next to the `.env` file the service reads at startup, so there is
//! a ready-to-edit example in the place the application looks.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root to `<data_local_dir>/playlist-maker/`.
///
/// - Linux: `~/.local/share/playlist-maker/.env.example`
/// - macOS: `~/Library/Application Support/playlist-maker/.env.example`
/// - Windows: `%LOCALAPPDATA%/playlist-maker/.env.example`
///
/// A missing template or a failed write only produces a cargo warning.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

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
    out_dir.push("playlist-maker");

    let copied = fs::create_dir_all(&out_dir).and_then(|_| {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)
    });
    if let Err(e) = copied {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}
