#![allow(clippy::needless_return)]

pub mod commands;
pub mod config;
pub mod exam_info;
pub mod report;
pub mod utils;

pub use config::{Args, Command, Settings};
pub use exam_info::{ExamInfoProvider, GeminiExamInfo};
