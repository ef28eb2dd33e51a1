//! Argument parsing and unknown-flag reporting

use clap::Parser;
use rstest::rstest;

use mindmap::cli::{unknown_flags, Cli, CliError};
use mindmap::exitcode;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn given_no_arguments_when_parsing_then_defaults() {
    let cli = Cli::try_parse_from(["mindmap"]).unwrap();
    assert!(cli.input.is_none());
    assert!(!cli.keep && !cli.latex && !cli.no_dates && !cli.show_config);
    assert_eq!(cli.verbose, 0);
}

#[rstest]
#[case(&["--frobnicate"], &["--frobnicate"])]
#[case(&["-k", "--frobnicate", "--wibble", "-q"], &["--frobnicate", "--wibble", "-q"])]
#[case(&["tree.json", "--latexx"], &["--latexx"])]
fn given_unknown_flags_when_scanning_then_all_reported(
    #[case] args: &[&str],
    #[case] expected: &[&str],
) {
    assert_eq!(unknown_flags(&strings(args)), strings(expected));
}

#[test]
fn given_unknown_flags_when_reporting_then_usage_exit_code() {
    let err = CliError::UnknownFlags(unknown_flags(&strings(&["--a", "--b"])));
    assert_eq!(err.exit_code(), exitcode::USAGE);
    assert!(err.to_string().contains("--a --b"));
}

#[test]
fn given_completions_shell_when_parsing_then_set() {
    let cli = Cli::try_parse_from(["mindmap", "--completions", "bash"]).unwrap();
    assert_eq!(cli.completions, Some(clap_complete::Shell::Bash));
}

#[test]
fn given_repeated_verbose_when_parsing_then_counted() {
    let cli = Cli::try_parse_from(["mindmap", "-v", "-v"]).unwrap();
    assert_eq!(cli.verbose, 2);
}
