pub mod config;
pub mod facts;
pub mod mode;
pub mod version;
