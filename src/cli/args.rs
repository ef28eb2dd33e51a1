//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueHint};

/// Render a dated classification tree into a family of PlantUML mindmaps
#[derive(Parser, Debug)]
#[command(name = "mindmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON classification tree (default from config: limitations.json)
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Keep intermediate .puml documents
    #[arg(short, long)]
    pub keep: bool,

    /// Write LaTeX figure snippets for rendered views
    #[arg(short, long)]
    pub latex: bool,

    /// Ignore dates; no date-based styling
    #[arg(long)]
    pub no_dates: bool,

    /// Diagnostic logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output directory for documents, images and snippets
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Additional config file (replaces ./.mindmap.toml)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    pub completions: Option<clap_complete::Shell>,
}

/// Collect every flag in `args` that the command does not define.
///
/// clap stops at the first unknown argument; this scan reports all of them.
/// `args` excludes the program name. Everything after `--` is positional.
pub fn unknown_flags(args: &[String]) -> Vec<String> {
    let cmd = Cli::command();
    let mut longs: Vec<String> = vec!["help".into(), "version".into()];
    let mut shorts: Vec<char> = vec!['h', 'V'];
    for arg in cmd.get_arguments() {
        longs.extend(arg.get_long().map(str::to_string));
        shorts.extend(arg.get_short());
    }
    let takes_value: Vec<String> = cmd
        .get_arguments()
        .filter(|a| a.get_action().takes_values() && !a.is_positional())
        .filter_map(|a| a.get_long().map(str::to_string))
        .collect();
    let short_takes_value: Vec<char> = cmd
        .get_arguments()
        .filter(|a| a.get_action().takes_values() && !a.is_positional())
        .filter_map(|a| a.get_short())
        .collect();

    let mut unknown = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if let Some(long) = arg.strip_prefix("--") {
            let name = long.split('=').next().unwrap_or(long);
            if !longs.iter().any(|l| l == name) {
                unknown.push(arg.clone());
            } else if !long.contains('=') && takes_value.iter().any(|l| l == name) {
                iter.next();
            }
        } else if let Some(cluster) = arg.strip_prefix('-').filter(|c| !c.is_empty()) {
            for (i, c) in cluster.char_indices() {
                if !shorts.contains(&c) {
                    unknown.push(format!("-{c}"));
                    continue;
                }
                if short_takes_value.contains(&c) {
                    // value is the rest of the cluster or the next argument
                    if i + c.len_utf8() == cluster.len() {
                        iter.next();
                    }
                    break;
                }
            }
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn given_known_flags_when_scanning_then_reports_nothing() {
        let found = unknown_flags(&args(&["-k", "--latex", "-vv", "-o", "out", "tree.json"]));
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn given_several_unknown_flags_when_scanning_then_reports_all() {
        let found = unknown_flags(&args(&["--bogus", "-k", "-x", "--nope=1"]));
        assert_eq!(found, vec!["--bogus", "-x", "--nope=1"]);
    }

    #[test]
    fn given_option_value_that_looks_like_flag_when_scanning_then_skips_it() {
        let found = unknown_flags(&args(&["--output-dir", "-weird-dir", "-c", "-odd.toml"]));
        assert!(found.is_empty(), "{found:?}");
    }

    #[test]
    fn given_unknown_letter_in_cluster_when_scanning_then_reports_letter() {
        assert_eq!(unknown_flags(&args(&["-kzl"])), vec!["-z"]);
    }

    #[rstest]
    #[case(&["--", "--not-a-flag"])]
    #[case(&["-"])]
    #[case(&["-otarget"])]
    fn given_positional_forms_when_scanning_then_reports_nothing(#[case] items: &[&str]) {
        assert!(unknown_flags(&args(items)).is_empty());
    }

    #[test]
    fn given_all_options_when_parsing_then_fields_set() {
        let cli = Cli::parse_from([
            "mindmap", "-k", "-l", "--no-dates", "-vvv", "-o", "out", "tree.json",
        ]);
        assert!(cli.keep && cli.latex && cli.no_dates);
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.input, Some(PathBuf::from("tree.json")));
    }
}
