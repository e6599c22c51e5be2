// Operator confirmations and free-text input

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};

pub trait Prompt {
    /// Yes/no question defaulting to no.
    fn confirm(&self, prompt: &str) -> Result<bool>;

    fn input(&self, prompt: &str) -> Result<String>;
}

pub struct TerminalPrompt {
    theme: ColorfulTheme,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    fn input(&self, prompt: &str) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }
}

/// Replays canned answers in order.
#[cfg(test)]
pub struct ScriptedPrompt {
    answers: std::cell::RefCell<std::collections::VecDeque<String>>,
    pub asked: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: std::cell::RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: std::cell::RefCell::new(Vec::new()),
        }
    }

    fn next(&self, prompt: &str) -> Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer for '{}'", prompt))
    }
}

#[cfg(test)]
impl Prompt for ScriptedPrompt {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = self.next(prompt)?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn input(&self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }
}
