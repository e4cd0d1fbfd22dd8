//! Business logic services

pub mod user_directory;

pub use user_directory::UserDirectory;
