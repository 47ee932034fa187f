pub mod admission;
pub mod ai;
pub mod api;
pub mod chat;
pub mod cli;
pub mod core;
pub mod directives;
pub mod jobs;
pub mod openai;
pub mod ui;
