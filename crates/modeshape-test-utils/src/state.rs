//! [`TestStateDir`] for persistence scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name the registry uses by default.
pub const STATE_FILE: &str = "serverRegistry.xml";

/// A temporary registry state directory with helpers for writing and
/// inspecting the registry file.
///
/// # Example
///
/// ```rust
/// use modeshape_test_utils::TestStateDir;
///
/// let state = TestStateDir::new();
/// state.write_state(r#"<servers><server url="http://h:8080" user="a"/></servers>"#);
/// assert!(state.state_file().exists());
/// ```
pub struct TestStateDir {
    temp_dir: TempDir,
}

impl Default for TestStateDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStateDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// The state directory to hand to the registry.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn state_file(&self) -> PathBuf {
        self.root().join(STATE_FILE)
    }

    /// Overwrite the registry file with `xml`.
    pub fn write_state(&self, xml: &str) {
        fs::write(self.state_file(), xml).unwrap();
    }

    /// Content of the registry file.
    ///
    /// # Panics
    /// Panics if the file does not exist.
    pub fn read_state(&self) -> String {
        fs::read_to_string(self.state_file()).unwrap_or_else(|e| {
            panic!(
                "Expected registry file at {}: {}",
                self.state_file().display(),
                e
            )
        })
    }

    /// Assert that the registry file does **not** exist.
    pub fn assert_no_state(&self) {
        assert!(
            !self.state_file().exists(),
            "Expected no registry file at {}",
            self.state_file().display()
        );
    }
}
