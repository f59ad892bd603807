//! Property-based tests for resolution, binding, and help rendering.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated manifests and argument vectors.

use std::collections::BTreeSet;

use proptest::prelude::*;

use tiller::bind::{bind, BindError};
use tiller::help::{render, HelpContext};
use tiller::manifest::{ArgSpec, CommandSpec, Manifest, OptionSpec};

/// Strategy for one command-name segment.
fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

/// Strategy for a possibly-namespaced command name (1-3 segments).
fn command_name() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..=3).prop_map(|segments| segments.join(":"))
}

/// Strategy for a set of distinct command names.
fn name_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(command_name(), 1..8)
}

fn manifest_of(names: &BTreeSet<String>) -> Manifest {
    let mut manifest = Manifest::new();
    for name in names {
        manifest = manifest.command(name.clone(), CommandSpec::new().summary("registered"));
    }
    manifest
}

proptest! {
    /// Resolving t against M is unknown iff t is not a key of M.
    #[test]
    fn resolution_is_exact_key_membership(
        names in name_set(),
        probe in command_name(),
    ) {
        let manifest = manifest_of(&names);

        for name in &names {
            prop_assert!(manifest.resolve(name).is_ok());
        }

        prop_assert_eq!(manifest.resolve(&probe).is_ok(), names.contains(&probe));
    }

    /// A required option fails with MissingOption iff neither alias
    /// appears, regardless of which optional flags are present.
    #[test]
    fn required_option_fails_iff_absent(
        supply_required in prop::option::of(prop_oneof![Just("short"), Just("long")]),
        optional_flags in prop::collection::vec(any::<bool>(), 3),
    ) {
        let mut spec = CommandSpec::new().option(
            OptionSpec::value("target").short("t").long("target").required(),
        );
        for index in 0..optional_flags.len() {
            spec = spec.option(
                OptionSpec::flag(format!("opt{index}"))
                    .short(format!("o{index}"))
                    .long(format!("opt{index}")),
            );
        }

        let mut argv = vec!["cmd".to_string()];
        for (index, present) in optional_flags.iter().enumerate() {
            if *present {
                argv.push(format!("--opt{index}"));
            }
        }
        match supply_required {
            Some("short") => {
                argv.push("-t".to_string());
                argv.push("value".to_string());
            }
            Some("long") => argv.push("--target=value".to_string()),
            _ => {}
        }

        let result = bind(&spec, &argv);
        match supply_required {
            Some(_) => {
                let params = result.expect("required option supplied");
                prop_assert_eq!(params.text("target"), Some("value"));
            }
            None => {
                let err = result.expect_err("required option absent");
                prop_assert!(matches!(err, BindError::MissingOption(_)));
            }
        }
    }

    /// Binding fails with MissingParameter iff fewer positional tokens
    /// remain than required at that position, and names the first
    /// unsatisfied parameter.
    #[test]
    fn required_positionals_fail_at_first_shortfall(
        required in 1usize..5,
        supplied in 0usize..7,
    ) {
        let mut spec = CommandSpec::new();
        for index in 0..required {
            spec = spec.arg(format!("arg{index}"), ArgSpec::new());
        }

        let mut argv = vec!["cmd".to_string()];
        for index in 0..supplied {
            argv.push(format!("value{index}"));
        }

        let result = bind(&spec, &argv);
        if supplied >= required {
            let params = result.expect("enough positional tokens");
            prop_assert_eq!(params.len(), required);
        } else {
            let err = result.expect_err("not enough positional tokens");
            match err {
                BindError::MissingParameter(name) => {
                    prop_assert_eq!(name, format!("arg{supplied}"));
                }
                other => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }

    /// Help rendering is a pure function of its inputs: two renders of the
    /// same manifest are byte-identical.
    #[test]
    fn help_rendering_is_deterministic(
        names in name_set(),
        version in "[0-9]\\.[0-9]\\.[0-9]",
        description in "[ -~]{0,40}",
    ) {
        colored::control::set_override(false);
        let manifest = manifest_of(&names);
        let ctx = HelpContext {
            manifest: &manifest,
            pkgname: "acme-cli",
            execname: "acme",
            version: &version,
            description: Some(&description),
        };

        let first = render(&ctx, None).expect("top-level help renders");
        let second = render(&ctx, None).expect("top-level help renders");
        prop_assert_eq!(first, second);

        for name in &names {
            let first = render(&ctx, Some(name)).expect("command help renders");
            let second = render(&ctx, Some(name)).expect("command help renders");
            prop_assert_eq!(first, second);
        }
    }
}
