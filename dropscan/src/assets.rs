use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Directories searched for relative asset paths, in priority order.
fn search_dirs() -> Vec<PathBuf> {
	let mut dirs = Vec::new();
	if let Some(dir) = std::env::var_os("DROPSCAN_ASSETS_DIR") {
		dirs.push(PathBuf::from(dir));
	}
	if let Ok(exe) = std::env::current_exe()
		&& let Some(dir) = exe.parent()
	{
		dirs.push(dir.to_path_buf());
	}
	if let Ok(cwd) = std::env::current_dir() {
		dirs.push(cwd);
	}
	// Compile-time path to the `dropscan/` crate. Useful during local dev if launched from elsewhere.
	#[cfg(debug_assertions)]
	dirs.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".."));
	dirs
}

/// Resolve an asset path so it works both:
/// - when running from the repo (`cargo run`), and
/// - when running a packaged binary (assets next to the executable).
///
/// Absolute paths are used as-is. You can add a search directory by setting
/// `DROPSCAN_ASSETS_DIR`.
pub fn resolve_asset(path: &Path) -> Result<PathBuf> {
	resolve_in(path, search_dirs())
}

fn resolve_in(path: &Path, dirs: Vec<PathBuf>) -> Result<PathBuf> {
	if path.is_absolute() {
		if path.is_file() {
			return Ok(path.to_path_buf());
		}
		bail!("asset {:?} does not exist", path);
	}

	let mut tried = Vec::new();
	for base in dirs {
		let candidate = base.join(path);
		if candidate.is_file() {
			return Ok(candidate);
		}
		tried.push(candidate);
	}

	bail!(
		"asset {:?} not found.\n\nSearched:\n{}\n\nFix: copy the file next to the executable (or set DROPSCAN_ASSETS_DIR to the folder that contains it).",
		path,
		tried
			.into_iter()
			.map(|p| format!("  - {}", p.display()))
			.collect::<Vec<_>>()
			.join("\n")
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_relative_asset_found_in_search_dir() {
		let dir = std::env::temp_dir().join(format!("dropscan-assets-{}", std::process::id()));
		std::fs::create_dir_all(dir.join("assets")).unwrap();
		std::fs::write(dir.join("assets/hud_mask.png"), b"").unwrap();

		let found = resolve_in(Path::new("assets/hud_mask.png"), vec![PathBuf::from("/nonexistent"), dir.clone()]).unwrap();
		assert_eq!(found, dir.join("assets/hud_mask.png"));

		std::fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn test_missing_asset_lists_search_dirs() {
		let err = resolve_in(Path::new("missing.png"), vec![PathBuf::from("/nonexistent")]).unwrap_err();
		assert!(err.to_string().contains("/nonexistent/missing.png"), "{err}");
	}
}
