//! Core traits for Cognita host applications.
//!
//! The primary trait is [`ConfigProvider`], which abstracts where a host
//! application keeps its concept data.

use std::path::PathBuf;

use crate::Result;

/// Trait for application-specific configuration.
///
/// Every Cognita-based application implements this trait to provide
/// the paths the engine's front ends need.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use cognita_core::traits::ConfigProvider;
/// use cognita_core::Result;
///
/// #[derive(Clone)]
/// struct CourseConfig {
///     data_dir: PathBuf,
/// }
///
/// impl ConfigProvider for CourseConfig {
///     fn project_name(&self) -> &str {
///         "cs-course"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.clone())
///     }
///
///     fn dataset_path(&self) -> Result<PathBuf> {
///         Ok(self.data_dir.join("concepts.json"))
///     }
/// }
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for env var prefixes and default paths.
    fn project_name(&self) -> &str;

    /// Base path for all project data.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn base_path(&self) -> Result<PathBuf>;

    /// Path to the concept dataset (concepts, relations, learner progress).
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved.
    fn dataset_path(&self) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestConfig {
        name: String,
        base: PathBuf,
    }

    impl ConfigProvider for TestConfig {
        fn project_name(&self) -> &str {
            &self.name
        }

        fn base_path(&self) -> Result<PathBuf> {
            Ok(self.base.clone())
        }

        fn dataset_path(&self) -> Result<PathBuf> {
            Ok(self.base.join("dataset.json"))
        }
    }

    #[test]
    fn test_config_provider_project_name() {
        let config = TestConfig {
            name: "test-project".into(),
            base: PathBuf::from("/tmp/test"),
        };
        assert_eq!(config.project_name(), "test-project");
    }

    #[test]
    fn test_config_provider_dataset_path() {
        let config = TestConfig {
            name: "test".into(),
            base: PathBuf::from("/data"),
        };
        assert_eq!(
            config.dataset_path().unwrap(),
            PathBuf::from("/data/dataset.json")
        );
    }

    #[test]
    fn test_config_provider_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TestConfig>();
    }
}
