use crate::error::{BlockconfError, Result};
use std::path::{Path, PathBuf};

/// Expand a leading `~/` (or a bare `~`) to the current user's home directory.
///
/// Any other path is returned unchanged; relative paths stay relative to the
/// process working directory.
pub fn expand_user(path: &Path) -> Result<PathBuf> {
	let Some(text) = path.to_str() else {
		return Ok(path.to_path_buf());
	};

	if text == "~" {
		return dirs::home_dir().ok_or(BlockconfError::HomeDirectoryNotFound);
	}

	match text.strip_prefix("~/") {
		Some(rest) => {
			let home_dir = dirs::home_dir().ok_or(BlockconfError::HomeDirectoryNotFound)?;
			Ok(home_dir.join(rest))
		}
		None => Ok(path.to_path_buf()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_plain_paths_unchanged() {
		let path = Path::new("/etc/app.cfg");
		assert_eq!(expand_user(path).unwrap(), PathBuf::from("/etc/app.cfg"));

		let path = Path::new("relative/app.cfg");
		assert_eq!(expand_user(path).unwrap(), PathBuf::from("relative/app.cfg"));

		// Only a leading tilde followed by a slash is special
		let path = Path::new("~other/app.cfg");
		assert_eq!(expand_user(path).unwrap(), PathBuf::from("~other/app.cfg"));
	}

	#[test]
	fn test_tilde_expands_to_home() {
		let Some(home) = dirs::home_dir() else {
			return;
		};

		let expanded = expand_user(Path::new("~/conf/app.cfg")).unwrap();
		assert_eq!(expanded, home.join("conf/app.cfg"));
		assert!(!expanded.to_string_lossy().contains('~'));

		assert_eq!(expand_user(Path::new("~")).unwrap(), home);
	}
}
