pub mod file;
pub mod keys;
pub mod memory;
pub mod store;
