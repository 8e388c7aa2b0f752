pub mod add;
pub mod audit;
pub mod config;
pub mod delete;
pub mod list;
pub mod migrate;
pub mod show;
pub mod update;
