// src/cli/handlers/mod.rs

// The actions of the bundled `actionline` tool.

pub mod greet;
pub mod run;

use crate::core::{
    action::Action,
    errors::UsageError,
    parameters::{FlagHandle, ParameterOptions},
    parser::{CommandLineParser, ExecuteHook, ToolOptions},
};
use anyhow::Result;
use async_trait::async_trait;
use colored::*;
use std::time::Instant;

/// Times every action; prints the duration when `--verbose` was given.
struct TimingHook {
    verbose: FlagHandle,
}

#[async_trait]
impl ExecuteHook for TimingHook {
    async fn on_execute(&self, action: &dyn Action) -> Result<()> {
        let started = Instant::now();
        let result = action.execute().await;
        let elapsed = started.elapsed();

        log::debug!("Action '{}' finished in {:?}.", action.name(), elapsed);
        if *self.verbose.value()? {
            eprintln!("{}", format!("{} took {:.2?}", action.name(), elapsed).dimmed());
        }
        result
    }
}

/// Builds the `actionline` tool: a global `--verbose` flag plus the `greet` and `run` actions.
pub fn build_parser() -> Result<CommandLineParser, UsageError> {
    let mut parser = CommandLineParser::new(ToolOptions::new("actionline", t!("demo.about")));

    let verbose = parser.parameters_mut()?.define_flag(
        ParameterOptions::new("--verbose", "Report how long the action took").short("-v"),
    )?;
    parser.add_action(greet::GreetAction::new()?)?;
    parser.add_action(run::RunAction::new()?)?;

    Ok(parser.with_execute_hook(TimingHook { verbose }))
}
