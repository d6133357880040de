//! Interactive shell loop built on reedline.

mod engine;
mod prompt;
mod validator;

pub use engine::ShellEngine;
pub use prompt::{compute_prompt, render_prompt, ShellPrompt};
pub use validator::StatementValidator;
