pub mod manager;
pub mod steps;
pub mod submission;
