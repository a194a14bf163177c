pub mod conversation_state;
pub mod coordinator;
pub mod prompt;

use std::io::Write;
use std::process::ExitCode;

use color_print::cstr;
use conversation_state::Role;
use coordinator::ResponseCoordinator;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::{execute, queue};
use eyre::Result;
use prompt::generate_prompt;
use tracing::warn;

use crate::provider::CompletionProvider;

const WELCOME_TEXT: &str = cstr!(
    "
<bold>Hi, I'm your research assistant.</bold> Ask me anything.

Things to try
• Summarize the current state of research on solid-state batteries.
• Compare two approaches to a problem and list their trade-offs.
• Explain a paper's key findings in plain language.

<green>/help</green>         Show the help dialogue
<green>/quit</green>         Quit the application
"
);

const HELP_TEXT: &str = cstr!(
    "
<bold>Research Chat CLI</bold>

<green>/clear</green>        Clear the conversation history
<green>/history</green>      Show the messages sent with the next request
<green>/help</green>         Show this help dialogue
<green>/quit</green>         Quit the application
"
);

/// Front-end loop around one chat session.
pub struct ChatContext<P> {
    output: Box<dyn Write + Send>,
    input: Option<String>,
    interactive: bool,
    session: ResponseCoordinator<P>,
}

impl<P: CompletionProvider> ChatContext<P> {
    pub fn new(
        output: Box<dyn Write + Send>,
        input: Option<String>,
        interactive: bool,
        session: ResponseCoordinator<P>,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            session,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            self.handle_input(&input).await?;
            return Ok(ExitCode::SUCCESS);
        }

        if self.interactive {
            writeln!(self.output, "{}", WELCOME_TEXT)?;
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let readline = rl.readline(&generate_prompt(self.session.turns()));

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Returns once the line has been fully handled and any reply streamed.
    pub async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            // Only meaningful to the interactive loop, which stops before getting here
            "/quit" => {}
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/clear" => {
                self.session.clear_history();
                writeln!(self.output, "Conversation cleared.")?;
            }
            "/history" => {
                self.print_history()?;
            }
            _ => {
                self.process_chat_input(input).await?;
            }
        }

        Ok(())
    }

    fn print_history(&mut self) -> Result<()> {
        for message in self.session.history() {
            let color = match message.role {
                Role::System => Color::DarkGrey,
                Role::User => Color::Green,
                Role::Assistant => Color::Cyan,
            };
            queue!(self.output, SetForegroundColor(color))?;
            write!(self.output, "[{}]", message.role.as_str())?;
            queue!(self.output, ResetColor)?;
            writeln!(self.output, " {}", message.content)?;
        }
        self.output.flush()?;
        Ok(())
    }

    async fn process_chat_input(&mut self, input: &str) -> Result<()> {
        let output = &mut self.output;
        execute!(output, SetForegroundColor(Color::Cyan))?;

        self.session
            .generate_response(input, |chunk| {
                // A closed stdout must not abort the turn; the reply is still recorded
                if let Err(e) = write!(output, "{}", chunk).and_then(|_| output.flush()) {
                    warn!("Failed to write response chunk: {}", e);
                }
            })
            .await;

        execute!(self.output, ResetColor)?;
        writeln!(self.output)?;
        Ok(())
    }
}
