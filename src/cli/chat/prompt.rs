use rustyline::{Config, Editor, Result};

/// Prompt shown before each line; counts the turns currently held in history.
pub fn generate_prompt(turns: usize) -> String {
    if turns == 0 {
        "> ".to_string()
    } else {
        format!("[{}] > ", turns)
    }
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}
