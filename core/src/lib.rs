pub mod journal;
pub mod resume;
pub mod storage;
pub mod track;

pub mod error;
