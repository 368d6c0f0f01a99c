use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Base name (no directory, no extension) of a parameter file path.
pub fn extract_base_name(path: &str) -> &str {
    Path::new(path)
        .file_stem()
        .and_then(|name| name.to_str())
        .unwrap_or("params")
}

/// Creates `out/<project>/<base name of params_path>[/<datetime>]` and returns it.
pub fn build_output_path_with_date_time(
    params_path: &str,
    project: &str,
    datetime: &Option<String>,
) -> io::Result<PathBuf> {
    let mut dirs = vec!["out", project, extract_base_name(params_path)];
    if let Some(inner_datetime_str) = datetime {
        dirs.push(inner_datetime_str);
    }

    let directory_path: PathBuf = dirs.iter().collect();
    std::fs::create_dir_all(&directory_path)?;
    Ok(directory_path)
}

pub fn date_time_string() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn maybe_date_time_string(enable: bool) -> Option<String> {
    if enable {
        Some(date_time_string())
    } else {
        None
    }
}

/**
 * Store a path and prefix together, making it easy to generate a collection of
 * files with the same prefix, but separate suffixes.
 */
#[derive(Debug, Clone)]
pub struct FilePrefix {
    pub directory_path: PathBuf,
    pub file_base: String,
}

impl FilePrefix {
    pub fn full_path_with_suffix(&self, suffix: &str) -> PathBuf {
        self.directory_path.join(self.file_base.clone() + suffix)
    }

    pub fn create_file_with_suffix(&self, suffix: &str) -> io::Result<io::BufWriter<std::fs::File>> {
        let file = std::fs::File::create(self.full_path_with_suffix(suffix))?;
        Ok(io::BufWriter::new(file))
    }

    /// Creates `directory_path/name` (if needed) and returns its path.
    pub fn create_sub_directory(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.directory_path.join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Writes `data` as pretty-printed JSON to `path`.
pub fn serialize_to_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(io::BufWriter::new(file), data)?;
    tracing::debug!("wrote json file to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_base_name() {
        assert_eq!(extract_base_name("demos/default/params.json"), "params");
        assert_eq!(extract_base_name("chaotic.json"), "chaotic");
    }

    #[test]
    fn test_date_time_string_layout() {
        let stamp = date_time_string();
        assert_eq!(stamp.len(), 15);
        assert_eq!(stamp.as_bytes()[8], b'_');
        assert!(maybe_date_time_string(false).is_none());
    }

    #[test]
    fn test_file_prefix_paths() {
        let prefix = FilePrefix {
            directory_path: PathBuf::from("out/render"),
            file_base: "pendulum".to_owned(),
        };
        assert_eq!(
            prefix.full_path_with_suffix("_diagnostics.txt"),
            PathBuf::from("out/render/pendulum_diagnostics.txt")
        );
    }
}
