// src/core/grammar.rs

// The boundary with `clap`. Declarations go in as a `Command` tree, and either
// `ArgMatches` or an `ExitSignal` comes back out.

use crate::{
    constants::ACTION_SELECTOR,
    core::{action::Action, errors::ExitSignal, parameters::ParameterSet, parser::ToolOptions},
};
use clap::builder::{StyledStr, Styles, styling::AnsiColor};
use clap::{ArgMatches, Command};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Yellow.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Green.on_default())
        .error(AnsiColor::BrightRed.on_default().bold())
}

pub(crate) fn epilogue(tool_filename: &str) -> String {
    format!(t!("cli.help.epilogue"), tool = tool_filename)
}

/// Renders engine output as plain text, or with ANSI styling when `colorize` is set.
pub(crate) fn render(styled: &StyledStr, colorize: bool) -> String {
    if colorize {
        styled.ansi().to_string()
    } else {
        styled.to_string()
    }
}

/// Builds the whole grammar: global parameters, then one sub-command per action.
pub(crate) fn build_command(
    tool: &ToolOptions,
    globals: &ParameterSet,
    actions: &[Box<dyn Action>],
) -> Command {
    let mut command = Command::new(tool.tool_filename.clone())
        .bin_name(tool.tool_filename.clone())
        .about(tool.tool_description.clone())
        .no_binary_name(true)
        .styles(styles())
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .subcommand_value_name(ACTION_SELECTOR)
        .subcommand_help_heading(t!("cli.help.actions_heading"))
        .after_help(epilogue(&tool.tool_filename))
        .args(globals.engine_args());

    // Registry order is help order.
    for action in actions {
        let definition = action.definition();
        let mut subcommand = Command::new(definition.name().to_string())
            .about(definition.summary().to_string())
            .args(definition.parameters().engine_args());
        // An empty long description would hide the summary in `--help`.
        if !definition.documentation().is_empty() {
            subcommand = subcommand.long_about(definition.documentation().to_string());
        }
        command = command.subcommand(subcommand);
    }

    command
}

pub(crate) fn parse(command: Command, args: &[String], colorize: bool) -> Result<ArgMatches, ExitSignal> {
    command
        .try_get_matches_from(args)
        .map_err(|error| exit_signal_from(&error, colorize))
}

/// Help requests become successful exits; everything else keeps the engine's exit code.
pub(crate) fn exit_signal_from(error: &clap::Error, colorize: bool) -> ExitSignal {
    let message = render(&error.render(), colorize);
    log::debug!("Grammar rejected input ({:?}).", error.kind());

    match error.exit_code() {
        0 => ExitSignal::success(message),
        code => ExitSignal::failure(code, Some(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        action::{ActionDefinition, ActionOptions},
        parameters::ParameterOptions,
    };
    use anyhow::Result;
    use async_trait::async_trait;

    struct NoopAction {
        definition: ActionDefinition,
    }

    #[async_trait]
    impl Action for NoopAction {
        fn definition(&self) -> &ActionDefinition {
            &self.definition
        }

        fn definition_mut(&mut self) -> &mut ActionDefinition {
            &mut self.definition
        }

        async fn execute(&self) -> Result<()> {
            Ok(())
        }
    }

    fn noop(name: &str, summary: &str) -> Box<dyn Action> {
        noop_documented(name, summary, &format!("Long documentation for {}.", name))
    }

    fn noop_documented(name: &str, summary: &str, documentation: &str) -> Box<dyn Action> {
        let mut definition = ActionDefinition::new(ActionOptions {
            action_name: name.to_string(),
            summary: summary.to_string(),
            documentation: documentation.to_string(),
        })
        .unwrap();
        definition
            .parameters_mut()
            .define_flag(ParameterOptions::new("--force", "Do it anyway"))
            .unwrap();
        Box::new(NoopAction { definition })
    }

    fn tool() -> ToolOptions {
        ToolOptions::new("widget", "Builds widgets.")
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_help_lists_actions_in_registry_order() {
        let actions = vec![noop("zeta", "Last letter"), noop("alpha", "First letter")];
        let help = build_command(&tool(), &ParameterSet::new(), &actions)
            .render_help()
            .to_string();

        let zeta = help.find("zeta").unwrap();
        let alpha = help.find("alpha").unwrap();
        assert!(zeta < alpha);
        assert!(help.contains("Builds widgets."));
        assert!(help.contains("widget <action> -h"));
    }

    #[test]
    fn test_help_request_is_a_successful_exit() {
        let actions = vec![noop("build", "Build it")];
        let command = build_command(&tool(), &ParameterSet::new(), &actions);

        let signal = parse(command, &args(&["build", "--help"]), false).unwrap_err();
        assert_eq!(signal.exit_code, 0);
        assert!(signal.message.unwrap().contains("Long documentation for build."));
    }

    #[test]
    fn test_action_help_names_the_tool() {
        let actions = vec![noop("build", "Build it")];
        let command = build_command(&tool(), &ParameterSet::new(), &actions);

        let message = parse(command, &args(&["build", "--help"]), false)
            .unwrap_err()
            .message
            .unwrap();
        assert!(message.contains("Usage: widget build"));
    }

    #[test]
    fn test_undocumented_action_help_shows_its_summary() {
        let actions = vec![noop_documented("build", "Build it", "")];
        let command = build_command(&tool(), &ParameterSet::new(), &actions);

        let message = parse(command, &args(&["build", "--help"]), false)
            .unwrap_err()
            .message
            .unwrap();
        assert!(message.contains("Build it"));
    }

    #[test]
    fn test_action_errors_name_the_tool() {
        let actions = vec![noop("build", "Build it")];
        let command = build_command(&tool(), &ParameterSet::new(), &actions);

        let signal = parse(command, &args(&["build", "--bogus"]), false).unwrap_err();
        assert_eq!(signal.exit_code, 2);
        assert!(signal.message.unwrap().contains("widget build"));
    }

    #[test]
    fn test_unknown_action_is_a_failure() {
        let actions = vec![noop("build", "Build it")];
        let command = build_command(&tool(), &ParameterSet::new(), &actions);

        let signal = parse(command, &args(&["deploy"]), false).unwrap_err();
        assert_ne!(signal.exit_code, 0);
        assert!(signal.message.unwrap().contains("deploy"));
    }

    #[test]
    fn test_action_parameters_follow_the_action_token() {
        let actions = vec![noop("build", "Build it")];

        let command = build_command(&tool(), &ParameterSet::new(), &actions);
        let matches = parse(command, &args(&["build", "--force"]), false).unwrap();
        let (name, sub_matches) = matches.subcommand().unwrap();
        assert_eq!(name, "build");
        assert!(sub_matches.get_flag("force"));

        let command = build_command(&tool(), &ParameterSet::new(), &actions);
        assert!(parse(command, &args(&["--force", "build"]), false).is_err());
    }
}
