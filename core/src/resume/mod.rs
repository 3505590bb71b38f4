pub mod ats;
pub mod migration;
pub mod model;
pub mod render;
pub mod session;
pub mod suggest;
