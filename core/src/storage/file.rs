use crate::error::{CoreError, CoreResult};
use crate::storage::store::StoreAdapter;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One file per key under a flat root directory. Values are stored verbatim;
/// callers decide whether a value is raw text or serialized JSON.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl AsRef<Path>) -> CoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> CoreResult<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(CoreError::InvalidInput(format!(
                "store key not filesystem-safe: {:?}",
                key
            )));
        }
        Ok(self.root.join(format!("{}.txt", key)))
    }
}

impl StoreAdapter for FileStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.entry_path(key)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path()).expect("open");

        assert_eq!(store.get("resumeBuilderData").expect("get"), None);
        store.set("resumeBuilderData", "{\"summary\":\"x\"}").expect("set");
        assert_eq!(
            store.get("resumeBuilderData").expect("get"),
            Some("{\"summary\":\"x\"}".to_string())
        );
        store.remove("resumeBuilderData").expect("remove");
        assert_eq!(store.get("resumeBuilderData").expect("get"), None);
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path()).expect("open");
        store.remove("rb_step_1_artifact").expect("remove");
    }

    #[test]
    fn rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).expect("open");
        assert!(store.get("../outside").is_err());
        assert!(store.get("").is_err());
    }
}
