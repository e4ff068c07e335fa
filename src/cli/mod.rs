pub mod builder;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod inspector;
pub mod interactive;
pub mod render;
