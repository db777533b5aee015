//! Terminal interface for AgriSage

mod config;
mod input;
mod ui;

pub use config::{AppConfig, DEFAULT_KNOWLEDGE_DIR, DEFAULT_LEARNED_STORE};
pub use input::{read_batch_file, sample_from_args};
pub use ui::{
    display_banner, render_answer, render_assessment, render_batch_table, render_status,
};

// Re-export core types
pub use agri_core::{Error, Result};
