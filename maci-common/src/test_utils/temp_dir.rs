use std::path::PathBuf;

const TEMP_DIR_ROOT_NAME: &str = "maci_test";

/// Temp directories for tests, one per module and test name.
pub struct TempDir;

impl TempDir {
    /// Path of the temp directory for the given module & name, no IO is done.
    pub fn build_path(module: &str, name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(TEMP_DIR_ROOT_NAME)
            .join(module)
            .join(name)
    }

    /// Create an empty temp directory for the given module & name.
    ///
    /// An existing directory at this location is removed first.
    pub fn create(module: &str, name: &str) -> PathBuf {
        let path = Self::build_path(module, name);
        if path.exists() {
            std::fs::remove_dir_all(&path)
                .unwrap_or_else(|e| panic!("Could not remove dir {path:?}: {e}"));
        }
        std::fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("Could not create dir {path:?}: {e}"));

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_an_empty_directory_under_the_module_folder() {
        let path = TempDir::create("temp_dir", "create_an_empty_directory");
        std::fs::write(path.join("file"), "content").unwrap();

        let path = TempDir::create("temp_dir", "create_an_empty_directory");

        assert!(path.ends_with("maci_test/temp_dir/create_an_empty_directory"));
        assert_eq!(0, std::fs::read_dir(&path).unwrap().count());
    }
}
