//! help
//!
//! Manifest-driven help renderer.
//!
//! # Design
//!
//! Help text is derived from the same [`Manifest`] the resolver and binder
//! use - never a separate data source - so usage lines, option tables, and
//! command listings cannot drift from execution behavior. Rendering is a
//! pure function of (command name, manifest, version, description): it
//! never executes a handler, and identical inputs yield byte-identical
//! output.
//!
//! Section order is fixed: top-level description and VERSION (top-level
//! page only), then summary, USAGE, OPTIONS, PARAMETERS, DESCRIPTION,
//! EXAMPLES, COMMANDS. Sections without content are omitted.
//!
//! Requesting help for an unknown command is the same
//! [`ResolveError::UnknownCommand`] the resolver reports.

use colored::Colorize;

use crate::manifest::{ChildEntry, Manifest, ResolveError, ResolvedCommand};

/// Read-only view over the configuration the renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct HelpContext<'a> {
    pub manifest: &'a Manifest,
    pub pkgname: &'a str,
    pub execname: &'a str,
    pub version: &'a str,
    pub description: Option<&'a str>,
}

/// Render the help page for `command`, or the top-level page for `None`.
pub fn render(ctx: &HelpContext<'_>, command: Option<&str>) -> Result<String, ResolveError> {
    let mut out = String::new();

    match command {
        None => {
            if let Some(description) = ctx.description {
                line(&mut out, description);
                line(&mut out, "");
            }
            line(&mut out, &"VERSION".bold().to_string());
            line(
                &mut out,
                &format!(
                    "  {}@{} {}-{}",
                    ctx.pkgname,
                    ctx.version,
                    std::env::consts::OS,
                    std::env::consts::ARCH
                ),
            );
            line(&mut out, "");
            commands_section(&mut out, &ctx.manifest.top_level());
        }
        Some(name) => {
            let resolved = ctx.manifest.resolve(name)?;
            command_page(&mut out, ctx, &resolved);
        }
    }

    Ok(out)
}

fn command_page(out: &mut String, ctx: &HelpContext<'_>, resolved: &ResolvedCommand) {
    let spec = &resolved.spec;

    if let Some(summary) = &spec.summary {
        line(out, summary);
        line(out, "");
    }

    // USAGE
    line(out, &"USAGE".bold().to_string());
    let mut usage = format!("  $ {} {}", ctx.execname, resolved.name);
    if !resolved.children.is_empty() {
        usage.push_str(":COMMAND");
    }
    if !spec.options.is_empty() {
        let any_required = spec.options.iter().any(|option| option.required);
        usage.push_str(if any_required { " OPTIONS" } else { " [OPTIONS]" });
    }
    for (name, arg) in &spec.args {
        if arg.optional {
            usage.push_str(&format!(" [{}]", name));
        } else {
            usage.push_str(&format!(" {}", name));
        }
    }
    line(out, &usage);
    line(out, "");

    // OPTIONS
    if !spec.options.is_empty() {
        line(out, &"OPTIONS".bold().to_string());
        let rows: Vec<(String, String)> = spec
            .options
            .iter()
            .map(|option| {
                (
                    option.canonical(),
                    tagged(option.required, option.description.as_deref()),
                )
            })
            .collect();
        table(out, &rows);
        line(out, "");
    }

    // PARAMETERS
    if !spec.args.is_empty() {
        line(out, &"PARAMETERS".bold().to_string());
        let rows: Vec<(String, String)> = spec
            .args
            .iter()
            .map(|(name, arg)| {
                (
                    name.clone(),
                    tagged(!arg.optional, arg.description.as_deref()),
                )
            })
            .collect();
        table(out, &rows);
        line(out, "");
    }

    // DESCRIPTION
    if let Some(description) = &spec.description {
        line(out, &"DESCRIPTION".bold().to_string());
        for text_line in description.trim().lines() {
            line(out, &format!("  {}", text_line.trim_start()));
        }
        line(out, "");
    }

    // EXAMPLES
    if !spec.examples.is_empty() {
        line(out, &"EXAMPLES".bold().to_string());
        for example in &spec.examples {
            line(out, &format!("  {}", example));
        }
        line(out, "");
    }

    // COMMANDS
    if !resolved.children.is_empty() {
        commands_section(out, &resolved.children);
    }
}

fn commands_section(out: &mut String, entries: &[ChildEntry]) {
    line(out, &"COMMANDS".bold().to_string());
    let rows: Vec<(String, String)> = entries
        .iter()
        .map(|entry| (entry.name.clone(), entry.summary.clone()))
        .collect();
    table(out, &rows);
    line(out, "");
}

/// `(required)`/`(optional)` tag plus description, dimmed tag.
fn tagged(required: bool, description: Option<&str>) -> String {
    let tag = if required {
        "(required)".dimmed()
    } else {
        "(optional)".dimmed()
    };
    match description {
        Some(description) => format!("{} {}", tag, description),
        None => tag.to_string(),
    }
}

/// Column-aligned two-column table with a 2-space indent and gutter.
fn table(out: &mut String, rows: &[(String, String)]) {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, right) in rows {
        let row = format!("  {:<width$}  {}", left, right, width = width);
        line(out, row.trim_end());
    }
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ArgSpec, CommandSpec, OptionSpec};

    fn manifest() -> Manifest {
        Manifest::new()
            .command(
                "greet",
                CommandSpec::new()
                    .summary("Say hello")
                    .description("  Greets somebody by name.\n    Politely.")
                    .option(
                        OptionSpec::value("greeting")
                            .short("g")
                            .long("greeting")
                            .describe("Greeting to use"),
                    )
                    .arg("name", ArgSpec::new().describe("Who to greet"))
                    .arg("title", ArgSpec::new().optional().describe("Honorific"))
                    .example("greet Ann")
                    .run(|_toolbox, _params| async { Ok(None) }),
            )
            .command("db", CommandSpec::new().summary("Database operations"))
            .command(
                "db:migrate",
                CommandSpec::new()
                    .summary("Run migrations")
                    .option(
                        OptionSpec::value("database")
                            .short("d")
                            .long("database")
                            .required()
                            .describe("Target database"),
                    )
                    .run(|_toolbox, _params| async { Ok(None) }),
            )
    }

    fn context(manifest: &Manifest) -> HelpContext<'_> {
        HelpContext {
            manifest,
            pkgname: "acme-cli",
            execname: "acme",
            version: "1.2.3",
            description: Some("The ACME command line"),
        }
    }

    #[test]
    fn top_level_page_sections() {
        colored::control::set_override(false);
        let manifest = manifest();
        let page = render(&context(&manifest), None).unwrap();

        assert!(page.starts_with("The ACME command line\n\nVERSION\n"));
        assert!(page.contains(&format!(
            "  acme-cli@1.2.3 {}-{}\n",
            std::env::consts::OS,
            std::env::consts::ARCH
        )));
        assert!(page.contains("COMMANDS\n"));
        assert!(page.contains("  greet  Say hello\n"));
        assert!(page.contains("  db     Database operations\n"));
        // Namespaced commands are not listed at the top level.
        assert!(!page.contains("db:migrate"));
        // No USAGE block on the top-level page.
        assert!(!page.contains("USAGE"));
    }

    #[test]
    fn leaf_page_sections_in_order() {
        colored::control::set_override(false);
        let manifest = manifest();
        let page = render(&context(&manifest), Some("greet")).unwrap();

        let usage_at = page.find("USAGE").unwrap();
        let options_at = page.find("OPTIONS").unwrap();
        let parameters_at = page.find("PARAMETERS").unwrap();
        let description_at = page.find("DESCRIPTION").unwrap();
        let examples_at = page.find("EXAMPLES").unwrap();
        assert!(usage_at < options_at);
        assert!(options_at < parameters_at);
        assert!(parameters_at < description_at);
        assert!(description_at < examples_at);

        assert!(page.starts_with("Say hello\n\n"));
        assert!(page.contains("  $ acme greet [OPTIONS] name [title]\n"));
        assert!(page.contains("  -g greeting, --greeting=greeting  (optional) Greeting to use\n"));
        assert!(page.contains("  name   (required) Who to greet\n"));
        assert!(page.contains("  title  (optional) Honorific\n"));
        assert!(page.contains("  greet Ann\n"));
    }

    #[test]
    fn description_lines_are_normalized_to_two_space_indent() {
        colored::control::set_override(false);
        let manifest = manifest();
        let page = render(&context(&manifest), Some("greet")).unwrap();
        assert!(page.contains("DESCRIPTION\n  Greets somebody by name.\n  Politely.\n"));
    }

    #[test]
    fn required_options_harden_the_usage_line() {
        colored::control::set_override(false);
        let manifest = manifest();
        let page = render(&context(&manifest), Some("db:migrate")).unwrap();
        assert!(page.contains("  $ acme db:migrate OPTIONS\n"));
        assert!(page.contains("(required) Target database"));
    }

    #[test]
    fn group_page_lists_children_and_placeholder_usage() {
        colored::control::set_override(false);
        let manifest = manifest();
        let page = render(&context(&manifest), Some("db")).unwrap();
        assert!(page.contains("  $ acme db:COMMAND\n"));
        assert!(page.contains("COMMANDS\n  db:migrate  Run migrations\n"));
    }

    #[test]
    fn unknown_command_is_a_resolve_error() {
        let manifest = manifest();
        assert_eq!(
            render(&context(&manifest), Some("bogus")).unwrap_err(),
            ResolveError::UnknownCommand("bogus".to_string())
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        colored::control::set_override(false);
        let manifest = manifest();
        let first = render(&context(&manifest), Some("greet")).unwrap();
        let second = render(&context(&manifest), Some("greet")).unwrap();
        assert_eq!(first, second);
    }
}
