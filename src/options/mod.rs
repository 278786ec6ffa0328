//! Option reconciliation: merge flag values, defaults and interactive prompts
//! into a validated option record.
//!
//! For each option:
//! 1. a value given on the command line wins, and is validated once;
//! 2. otherwise, in interactive mode (or when a mandatory option has no
//!    value yet) the user is asked, with the default pre-filled;
//! 3. otherwise the default is taken.
//!
//! Whether a flag was given is tracked in [`ChangedFlags`], never inferred
//! from the value being empty.

pub mod break_glass;
pub mod external_auth;
pub mod prompt;
pub mod tuning;
pub mod upgrade;
pub mod validate;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::RosaError;
use crate::reporter::Reporter;
use prompt::{Prompter, Question};
use validate::{split_list, Validator};

/// Prompt attempts before an invalid answer fails the command.
pub const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Names (without dashes) of the flags given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFlags(HashSet<String>);

impl ChangedFlags {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn changed(&self, flag: &str) -> bool {
        self.0.contains(flag)
    }

    /// Was any of `flags` given?
    pub fn any(&self, flags: &[&str]) -> bool {
        flags.iter().any(|f| self.changed(f))
    }

    /// Copy with `flag` marked as given.
    pub fn with(&self, flag: &str) -> Self {
        let mut set = self.0.clone();
        set.insert(flag.to_string());
        Self(set)
    }
}

/// Process-wide interactive switch. Only ever turns on.
#[derive(Debug, Default)]
pub struct InteractiveMode(AtomicBool);

impl InteractiveMode {
    pub fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    pub fn enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Turn interactive mode on. Returns `true` only for the call that
    /// actually flipped it.
    pub fn enable(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }
}

/// One option as seen by the reconciler.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec<'a> {
    pub flag: &'a str,
    pub label: &'a str,
    pub default: &'a str,
    pub required: bool,
    pub validator: Option<Validator>,
}

impl<'a> OptionSpec<'a> {
    pub fn new(flag: &'a str, label: &'a str) -> Self {
        Self {
            flag,
            label,
            default: "",
            required: false,
            validator: None,
        }
    }

    pub fn default(mut self, default: &'a str) -> Self {
        self.default = default;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    fn question(&self) -> Question<'a> {
        Question::new(self.flag, self.label)
            .default(self.default)
            .required(self.required)
    }

    fn check(&self, value: &str) -> Result<(), String> {
        if self.required && value.trim().is_empty() {
            return Err(format!("'--{}' is required", self.flag));
        }
        match self.validator {
            Some(validator) if !value.is_empty() => validator(value),
            _ => Ok(()),
        }
    }
}

/// Shared state for reconciling one command's options.
pub struct Reconciler<'a> {
    pub flags: &'a ChangedFlags,
    pub interactive: &'a InteractiveMode,
    pub prompter: &'a dyn Prompter,
    pub reporter: &'a Reporter,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        flags: &'a ChangedFlags,
        interactive: &'a InteractiveMode,
        prompter: &'a dyn Prompter,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            flags,
            interactive,
            prompter,
            reporter,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive.enabled()
    }

    /// Whether anyone can answer a prompt.
    pub fn can_prompt(&self) -> bool {
        self.prompter.can_ask()
    }

    /// When none of `options` was given and interactive mode is off, turn it
    /// on and say so. Returns whether interactive mode is on afterwards.
    pub fn enable_interactive_if_none_given(&self, options: &[&str]) -> bool {
        if !self.interactive.enabled() && !self.flags.any(options) && self.interactive.enable() {
            self.reporter.info("Enabling interactive mode");
        }
        self.interactive.enabled()
    }

    /// Turn interactive mode on without a diagnostic.
    pub fn force_interactive(&self) {
        if self.interactive.enable() {
            tracing::debug!("interactive mode forced on");
        }
    }

    fn should_prompt(&self, spec: &OptionSpec<'_>) -> bool {
        self.interactive.enabled() || (spec.required && spec.default.is_empty())
    }

    /// Resolve a single-valued option.
    pub fn string(&self, spec: OptionSpec<'_>, flag_value: &str) -> crate::Result<String> {
        if self.flags.changed(spec.flag) {
            spec.check(flag_value).map_err(|msg| flag_error(spec.flag, msg))?;
            return Ok(flag_value.to_string());
        }
        if self.should_prompt(&spec) {
            return self.ask(&spec, |q| self.prompter.input(q));
        }
        Ok(spec.default.to_string())
    }

    /// Resolve a secret option. Prompts hide the answer.
    pub fn secret(&self, spec: OptionSpec<'_>, flag_value: &str) -> crate::Result<String> {
        if self.flags.changed(spec.flag) {
            spec.check(flag_value).map_err(|msg| flag_error(spec.flag, msg))?;
            return Ok(flag_value.to_string());
        }
        if self.should_prompt(&spec) {
            return self.ask(&spec, |q| self.prompter.secret(q));
        }
        Ok(spec.default.to_string())
    }

    /// Resolve a comma-separated list option. Empty fragments are dropped and
    /// the validator runs on each item.
    pub fn list(&self, spec: OptionSpec<'_>, flag_values: &[String]) -> crate::Result<Vec<String>> {
        let item_spec = OptionSpec {
            required: false,
            ..spec
        };
        let check_all = |items: &[String]| -> Result<(), String> {
            if spec.required && items.is_empty() {
                return Err(format!("'--{}' is required", spec.flag));
            }
            items.iter().try_for_each(|i| item_spec.check(i))
        };

        if self.flags.changed(spec.flag) {
            let items: Vec<String> = flag_values.iter().flat_map(|v| split_list(v)).collect();
            check_all(&items).map_err(|msg| flag_error(spec.flag, msg))?;
            return Ok(items);
        }
        if self.should_prompt(&spec) {
            let question = spec.question();
            let mut last_error = String::new();
            for attempt in 1..=MAX_PROMPT_ATTEMPTS {
                let items = split_list(&self.prompter.input(&question)?);
                match check_all(&items) {
                    Ok(()) => return Ok(items),
                    Err(msg) => {
                        tracing::debug!(flag = spec.flag, attempt, "rejected prompt answer");
                        self.reporter.warn(&msg);
                        last_error = msg;
                    }
                }
            }
            return Err(RosaError::Validation(last_error));
        }
        Ok(split_list(spec.default))
    }

    /// Resolve a boolean option; prompts are yes/no confirmations.
    pub fn boolean(&self, spec: OptionSpec<'_>, flag_value: bool, default: bool) -> crate::Result<bool> {
        if self.flags.changed(spec.flag) {
            return Ok(flag_value);
        }
        if self.interactive.enabled() {
            return self.prompter.confirm(spec.label, default);
        }
        Ok(default)
    }

    /// Pick one of `options`, prompting in interactive mode.
    pub fn choose(
        &self,
        spec: OptionSpec<'_>,
        flag_value: &str,
        options: &[String],
    ) -> crate::Result<String> {
        if self.flags.changed(spec.flag) {
            return Ok(flag_value.to_string());
        }
        if self.interactive.enabled() && !options.is_empty() {
            return self.prompter.select(&spec.question(), options);
        }
        Ok(spec.default.to_string())
    }

    fn ask<F>(&self, spec: &OptionSpec<'_>, prompt: F) -> crate::Result<String>
    where
        F: Fn(&Question<'_>) -> crate::Result<String>,
    {
        let question = spec.question();
        let mut last_error = String::new();
        for attempt in 1..=MAX_PROMPT_ATTEMPTS {
            let answer = prompt(&question)?;
            let answer = if answer.is_empty() {
                spec.default.to_string()
            } else {
                answer
            };
            match spec.check(&answer) {
                Ok(()) => return Ok(answer),
                Err(msg) => {
                    tracing::debug!(flag = spec.flag, attempt, "rejected prompt answer");
                    self.reporter.warn(&msg);
                    last_error = msg;
                }
            }
        }
        Err(RosaError::Validation(last_error))
    }
}

fn flag_error(flag: &str, msg: String) -> RosaError {
    RosaError::Validation(format!("Invalid value for '--{}': {}", flag, msg))
}
