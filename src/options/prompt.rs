//! Prompting capability used by the option reconciler.
//!
//! The reconciler only sees [`Prompter`]. A terminal-attached process gets
//! [`TerminalPrompter`]; anything else gets [`NonInteractivePrompter`], which
//! answers with the default and refuses mandatory questions that have none.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::error::RosaError;

/// A single question about one option.
#[derive(Debug, Clone, Copy)]
pub struct Question<'a> {
    /// Flag the answer stands in for, without leading dashes.
    pub flag: &'a str,
    pub label: &'a str,
    pub default: &'a str,
    pub required: bool,
}

impl<'a> Question<'a> {
    pub fn new(flag: &'a str, label: &'a str) -> Self {
        Self {
            flag,
            label,
            default: "",
            required: false,
        }
    }

    pub fn default(mut self, default: &'a str) -> Self {
        self.default = default;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    fn missing(&self) -> RosaError {
        RosaError::Validation(format!(
            "Expected a value for '--{}': {} is required",
            self.flag, self.label
        ))
    }
}

pub trait Prompter: Send + Sync {
    /// Free-text answer. An empty answer means "take the default".
    fn input(&self, question: &Question<'_>) -> crate::Result<String>;

    /// Hidden free-text answer.
    fn secret(&self, question: &Question<'_>) -> crate::Result<String>;

    /// One of `options`; `question.default` preselects a matching entry.
    fn select(&self, question: &Question<'_>, options: &[String]) -> crate::Result<String>;

    fn confirm(&self, prompt: &str, default: bool) -> crate::Result<bool>;

    /// Whether a person is there to answer.
    fn can_ask(&self) -> bool {
        true
    }
}

fn prompt_err(err: dialoguer::Error) -> RosaError {
    RosaError::Prompt(err.to_string())
}

/// Prompts on the attached terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, question: &Question<'_>) -> crate::Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(question.label)
            .allow_empty(!question.required || !question.default.is_empty());
        if !question.default.is_empty() {
            input = input.default(question.default.to_string());
        }
        input.interact_text().map_err(prompt_err)
    }

    fn secret(&self, question: &Question<'_>) -> crate::Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(question.label)
            .allow_empty_password(!question.required)
            .interact()
            .map_err(prompt_err)
    }

    fn select(&self, question: &Question<'_>, options: &[String]) -> crate::Result<String> {
        if options.is_empty() {
            return Err(question.missing());
        }
        let default = options
            .iter()
            .position(|o| o == question.default)
            .unwrap_or(0);
        let index = Select::with_theme(&self.theme)
            .with_prompt(question.label)
            .items(options)
            .default(default)
            .interact()
            .map_err(prompt_err)?;
        Ok(options[index].clone())
    }

    fn confirm(&self, prompt: &str, default: bool) -> crate::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(prompt_err)
    }
}

/// Answers every question with its default.
#[derive(Debug, Default)]
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn input(&self, question: &Question<'_>) -> crate::Result<String> {
        if question.required && question.default.is_empty() {
            return Err(question.missing());
        }
        Ok(question.default.to_string())
    }

    fn secret(&self, question: &Question<'_>) -> crate::Result<String> {
        self.input(question)
    }

    fn select(&self, question: &Question<'_>, options: &[String]) -> crate::Result<String> {
        if !question.default.is_empty() {
            return Ok(question.default.to_string());
        }
        options.first().cloned().ok_or_else(|| question.missing())
    }

    fn confirm(&self, _prompt: &str, default: bool) -> crate::Result<bool> {
        Ok(default)
    }

    fn can_ask(&self) -> bool {
        false
    }
}

#[cfg(test)]
pub use scripted::ScriptedPrompter;
