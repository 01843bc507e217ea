//! Help text rendering
//!
//! Pure functions from the command model to text. Nothing here parses or mutates.

use crate::model::{Command, Parameter};
use colored::Colorize;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Application identity shown in help output
#[derive(Debug, Clone, Copy)]
pub struct HelpContext<'a> {
    pub app_name: &'a str,
    pub description: &'a str,
    pub colored: bool,
}

impl HelpContext<'_> {
    fn heading(&self, text: &str) -> String {
        if self.colored {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn accent(&self, text: &str) -> String {
        if self.colored {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Top-level help listing every command alphabetically
pub fn render_global<I>(ctx: &HelpContext<'_>, commands: I) -> String
where
    I: IntoIterator<Item = Arc<Command>>,
{
    let mut commands: Vec<Arc<Command>> = commands.into_iter().collect();
    commands.sort_by(|a, b| a.name().cmp(b.name()));

    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_global(&mut out, ctx, &commands);
    out
}

/// Help for a single command: positional arguments first, then options
pub fn render_command(ctx: &HelpContext<'_>, command: &Command) -> String {
    let mut out = String::new();
    let _ = write_command(&mut out, ctx, command);
    out.trim_end().to_string()
}

fn write_global(out: &mut String, ctx: &HelpContext<'_>, commands: &[Arc<Command>]) -> fmt::Result {
    if ctx.description.trim().is_empty() {
        writeln!(out, "{}\n", ctx.app_name)?;
    } else {
        writeln!(out, "{} - {}\n", ctx.app_name, ctx.description)?;
    }

    writeln!(out, "{}", ctx.heading("USAGE:"))?;
    writeln!(out, "  {} <command> [options] [arguments]\n", ctx.app_name)?;

    writeln!(out, "{}", ctx.heading("COMMANDS:"))?;
    for command in commands {
        let name = ctx.accent(command.name());
        if command.description().is_empty() {
            writeln!(out, "  {}", name)?;
        } else {
            writeln!(out, "  {} | {}", name, command.description())?;
        }
    }

    write!(
        out,
        "\nUse '{} <command> --help' for more information about a command.",
        ctx.app_name
    )
}

fn write_command(out: &mut String, ctx: &HelpContext<'_>, command: &Command) -> fmt::Result {
    writeln!(
        out,
        "Usage: {} {} [OPTIONS] [ARGUMENTS]",
        ctx.app_name,
        command.name()
    )?;

    if !command.description().is_empty() {
        write!(out, "\n{}\n", command.description())?;
    }

    if !command.aliases().is_empty() {
        write!(out, "\nAliases: {}\n", command.aliases().join(", "))?;
    }

    let mut arguments: Vec<&Parameter> = command
        .parameters()
        .iter()
        .filter(|p| p.is_positional())
        .collect();
    arguments.sort_by_key(|p| p.position());

    if !arguments.is_empty() {
        write!(out, "\n{}\n", ctx.heading("Arguments:"))?;
        for arg in arguments {
            let tag = if arg.is_required() {
                "(required)"
            } else {
                "(optional)"
            };
            writeln!(
                out,
                "  {} {}  {}",
                ctx.accent(&arg.name().to_uppercase()),
                tag,
                arg.description()
            )?;
        }
    }

    let options: Vec<&Parameter> = command
        .parameters()
        .iter()
        .filter(|p| !p.is_positional())
        .collect();

    if !options.is_empty() {
        write!(out, "\n{}\n", ctx.heading("Options:"))?;
        for opt in options {
            let short = opt
                .short_flag()
                .map(|s| format!("-{},", s))
                .unwrap_or_else(|| "   ".to_string());
            let long = format!("--{}", opt.long_flag().unwrap_or_default());
            let mut line = format!("  {} {}  {}", short, ctx.accent(&long), opt.description());
            if let Some(default) = opt.default_text() {
                write!(line, " (default: {})", default)?;
            }
            writeln!(out, "{}", line.trim_end())?;
        }
    }
    Ok(())
}
