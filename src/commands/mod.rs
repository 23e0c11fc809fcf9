pub mod config;
pub mod create;
pub mod delete;
pub mod gallery;
pub mod list;
pub mod show;
pub mod upload;
