use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_SOURCE_PATH: &str = "EmployeeProductionExport.xlsx";
pub const DEFAULT_DEST_PATH: &str = "EmployeeProductionExport.json";
pub const DEFAULT_REPO_PATH: &str = ".";
pub const DEFAULT_REMOTE_NAME: &str = "origin";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update EmployeeProductionExport.json";

/// Cell texts read as missing values, matching common dataframe readers.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source_path: PathBuf,
    pub dest_path: PathBuf,
    /// Working directory of the repository the export is published to
    pub repo_path: PathBuf,
    pub remote_name: String,
    pub commit_message: String,
    pub publish: bool,
    pub missing_markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            dest_path: PathBuf::from(DEFAULT_DEST_PATH),
            repo_path: PathBuf::from(DEFAULT_REPO_PATH),
            remote_name: DEFAULT_REMOTE_NAME.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            publish: false,
            missing_markers: default_missing_markers(),
        }
    }
}

pub fn default_missing_markers() -> Vec<String> {
    DEFAULT_MISSING_MARKERS.iter().map(|s| s.to_string()).collect()
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),

    #[error("Destination is a directory: {}", .0.display())]
    DestinationIsDirectory(PathBuf),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyValue("source path"));
        }
        if self.dest_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyValue("destination path"));
        }
        if self.dest_path.is_dir() {
            return Err(ConfigError::DestinationIsDirectory(self.dest_path.clone()));
        }

        if self.publish {
            if self.repo_path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyValue("repository path"));
            }
            if self.remote_name.trim().is_empty() {
                return Err(ConfigError::EmptyValue("remote name"));
            }
            if self.commit_message.trim().is_empty() {
                return Err(ConfigError::EmptyValue("commit message"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert!(!config.publish);
        assert!(config.missing_markers.iter().any(|m| m.is_empty()));
        assert!(config.missing_markers.contains(&"#N/A".to_string()));
    }

    #[test]
    fn test_rejects_empty_values() {
        let config = Config {
            dest_path: PathBuf::new(),
            ..Config::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyValue("destination path"))
        );

        // Publishing settings only matter when publishing
        let config = Config {
            remote_name: " ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.validate(), Ok(()));

        let config = Config {
            remote_name: " ".to_string(),
            publish: true,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyValue("remote name")));
    }

    #[test]
    fn test_rejects_directory_destination() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            dest_path: dir.path().to_path_buf(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DestinationIsDirectory(_))
        ));
    }
}
