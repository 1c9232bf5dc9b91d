pub mod config;
pub mod notify;
pub mod settings;
pub mod timer;
