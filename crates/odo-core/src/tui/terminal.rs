//! cliclack implementation of the prompt primitives

use crate::init::Prompter;
use anyhow::Result;

/// Inline prompts on the controlling terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(
        &mut self,
        message: &str,
        options: &[String],
        default: Option<usize>,
    ) -> Result<usize> {
        // Use indices so duplicate labels stay distinguishable
        let mut select = cliclack::select(message);
        for (idx, label) in options.iter().enumerate() {
            select = select.item(idx, label, "");
        }
        if let Some(default) = default {
            select = select.initial_value(default);
        }
        Ok(select.interact()?)
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let mut input = cliclack::input(message).required(false);
        if let Some(default) = default {
            input = input.placeholder(default).default_input(default);
        }
        Ok(input.interact()?)
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        cliclack::log::warning(message)?;
        Ok(())
    }

    fn note(&mut self, title: &str, body: &str) -> Result<()> {
        cliclack::note(title, body)?;
        Ok(())
    }
}
