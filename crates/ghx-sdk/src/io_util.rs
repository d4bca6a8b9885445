use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Permission bits applied to report artifacts written by `write_file`.
#[cfg(unix)]
const ARTIFACT_FILE_MODE: u32 = 0o600;

/// File-system helpers shared by the report and environment-file layers.
pub struct IOUtil;

impl IOUtil {
    /// Serialize a value as pretty JSON and write it to a file, creating
    /// parent directories as needed.
    pub fn save_object<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize object for '{}'", path.display()))?;
        Self::ensure_parent(path)?;
        fs::write(path, json.as_bytes())
            .with_context(|| format!("Failed to write object to '{}'", path.display()))?;
        Ok(())
    }

    /// Read a file and deserialize it from JSON.
    pub fn load_object<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file '{}'", path.display()))?;
        let value = serde_json::from_str(&json)
            .with_context(|| format!("Failed to deserialize JSON from '{}'", path.display()))?;
        Ok(value)
    }

    /// Write raw bytes to a file, creating parent directories as needed.
    /// On unix the file is readable by the owner only.
    pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
        Self::ensure_parent(path)?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write file '{}'", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(ARTIFACT_FILE_MODE))
                .with_context(|| format!("Failed to set permissions on '{}'", path.display()))?;
        }

        Ok(())
    }

    /// Copy `src` to `dst` byte for byte, creating the destination directory.
    pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
        Self::ensure_parent(dst)?;
        fs::copy(src, dst).with_context(|| {
            format!("Failed to copy '{}' to '{}'", src.display(), dst.display())
        })?;
        Ok(())
    }

    /// Make sure a file exists. A missing file is created with `default_content`;
    /// an existing file is left untouched.
    pub fn ensure_file(path: &Path, default_content: &str) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        Self::ensure_parent(path)?;
        fs::write(path, default_content)
            .with_context(|| format!("Failed to create file '{}'", path.display()))?;
        Ok(())
    }

    /// Read a whole file as UTF-8. A missing file reads as an empty string.
    pub fn read_to_string_if_exists(path: &Path) -> Result<String> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read file '{}'", path.display()))
            }
        }
    }

    /// Delete a single file. Deleting a missing file is not an error.
    pub fn delete_file(path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(path)
            .with_context(|| format!("Failed to delete file '{}'", path.display()))?;
        Ok(())
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory '{}'", parent.display())
                })?;
            }
        }
        Ok(())
    }
}
