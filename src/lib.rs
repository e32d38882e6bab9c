pub mod alert;
pub mod buffer;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod input;
pub mod ui;
