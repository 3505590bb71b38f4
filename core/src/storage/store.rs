use crate::error::CoreResult;

/// String-keyed persistence boundary. Everything the builder and the build
/// track persist goes through this interface; implementations decide where
/// the strings live.
pub trait StoreAdapter {
    fn get(&self, key: &str) -> CoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> CoreResult<()>;
    fn remove(&mut self, key: &str) -> CoreResult<()>;
}
