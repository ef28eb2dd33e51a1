//! Tree to mindmap outline serialization
//!
//! Produces one line per emitted node: `<tabs>* <label>[ <<tag>>]`, with
//! tab depth equal to the working indent. Children are walked in insertion
//! order, limited by a depth budget, with an optional directive that moves the
//! remaining first-level siblings to the opposite side of the diagram.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::error::DomainResult;
use crate::domain::style::StyleTable;
use crate::domain::tree::TreeNode;

/// Tag forced onto the root line(s).
pub const ROOT_TAG: &str = "root";

/// Layout directive sending subsequent siblings to the other side.
pub const SIDE_SWITCH_DIRECTIVE: &str = "left side";

/// Depth used when no cutoff is configured.
pub const UNBOUNDED_DEPTH: usize = 999;

/// Position among first-level children after which the side switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSideSwitch", into = "RawSideSwitch")]
pub enum SideSwitch {
    /// Zero-based child position.
    Index(usize),
    /// Middle of the children: `ceil(n / 2) - 1`.
    Half,
}

impl SideSwitch {
    /// Resolve to a concrete position for a node with `child_count` children.
    pub fn position(self, child_count: usize) -> Option<usize> {
        match self {
            Self::Index(i) => Some(i),
            Self::Half => child_count.div_ceil(2).checked_sub(1),
        }
    }
}

impl FromStr for SideSwitch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "half" => Ok(Self::Half),
            other => other
                .parse::<usize>()
                .map(Self::Index)
                .map_err(|_| format!("side switch must be an index or \"half\", got {other:?}")),
        }
    }
}

impl fmt::Display for SideSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Half => write!(f, "half"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSideSwitch {
    Index(usize),
    Keyword(String),
}

impl TryFrom<RawSideSwitch> for SideSwitch {
    type Error = String;

    fn try_from(raw: RawSideSwitch) -> Result<Self, Self::Error> {
        match raw {
            RawSideSwitch::Index(i) => Ok(Self::Index(i)),
            RawSideSwitch::Keyword(k) => k.parse(),
        }
    }
}

impl From<SideSwitch> for RawSideSwitch {
    fn from(switch: SideSwitch) -> Self {
        match switch {
            SideSwitch::Index(i) => Self::Index(i),
            SideSwitch::Half => Self::Keyword("half".to_string()),
        }
    }
}

/// Per-render settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Levels below the working root to emit; 0 emits only the first level.
    pub max_depth: usize,
    /// Synthetic label emitted above the tree.
    pub root_label: Option<String>,
    pub side_switch: Option<SideSwitch>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: UNBOUNDED_DEPTH,
            root_label: None,
            side_switch: None,
        }
    }
}

/// Walks a tree and emits the mindmap body.
///
/// Date styling is resolved through the style table unless disabled, in
/// which case only the root tag is emitted.
#[derive(Debug, Clone, Copy)]
pub struct TreeSerializer<'a> {
    styles: Option<&'a StyleTable>,
}

impl<'a> TreeSerializer<'a> {
    pub fn new(styles: &'a StyleTable) -> Self {
        Self {
            styles: Some(styles),
        }
    }

    /// Serializer that ignores node dates.
    pub fn without_dates() -> Self {
        Self { styles: None }
    }

    /// Serialize `node` into body lines.
    ///
    /// Fails on the first malformed node date; no partial output is returned.
    #[instrument(level = "debug", skip(self, node), fields(root = ?config.root_label))]
    pub fn serialize(&self, node: &TreeNode, config: &RenderConfig) -> DomainResult<Vec<String>> {
        let mut lines = Vec::new();
        let mut indent = 0;

        if let Some(label) = &config.root_label {
            lines.push(format_line(0, label, Some(ROOT_TAG)));
            indent = 1;
        }

        self.walk(node, config.max_depth, indent, config, &mut lines)?;
        trace!("serialized {} lines", lines.len());
        Ok(lines)
    }

    fn walk(
        &self,
        node: &TreeNode,
        depth: usize,
        indent: usize,
        config: &RenderConfig,
        lines: &mut Vec<String>,
    ) -> DomainResult<()> {
        let Some(children) = node.children() else {
            return Ok(());
        };

        let switch_at = match config.side_switch {
            Some(switch) if indent == 1 => switch.position(children.len()),
            _ => None,
        };

        for (i, (label, child)) in children.iter().enumerate() {
            let tag = if indent == 0 {
                Some(ROOT_TAG)
            } else {
                self.tag_for(child)?
            };
            lines.push(format_line(indent, label, tag));

            if depth > 0 && child.has_children() {
                self.walk(child, depth - 1, indent + 1, config, lines)?;
            }

            if switch_at == Some(i) {
                lines.push(SIDE_SWITCH_DIRECTIVE.to_string());
            }
        }
        Ok(())
    }

    fn tag_for(&self, node: &TreeNode) -> DomainResult<Option<&'a str>> {
        match self.styles {
            Some(styles) => styles.resolve(node.date()),
            None => Ok(None),
        }
    }
}

fn format_line(indent: usize, label: &str, tag: Option<&str>) -> String {
    let mut line = "\t".repeat(indent);
    line.push_str("* ");
    line.push_str(label);
    if let Some(tag) = tag {
        line.push_str(" <<");
        line.push_str(tag);
        line.push_str(">>");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::style::StyleRule;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> TreeNode {
        TreeNode::from_json(&value).unwrap()
    }

    fn styles() -> StyleTable {
        StyleTable::new(&[
            StyleRule::new("2025-03-01", Some("first")),
            StyleRule::new("2025-09-01", Some("second")),
        ])
        .unwrap()
    }

    fn config(max_depth: usize) -> RenderConfig {
        RenderConfig {
            max_depth,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn given_unbounded_depth_when_serializing_then_emits_every_node() {
        let table = styles();
        let lines = TreeSerializer::new(&table)
            .serialize(
                &tree(json!({ "A": { "x": {}, "y": {} }, "B": {} })),
                &RenderConfig::default(),
            )
            .unwrap();

        assert_eq!(lines, vec!["* A <<root>>", "\t* x", "\t* y", "* B <<root>>"]);
    }

    #[test]
    fn given_zero_depth_when_serializing_then_emits_top_level_only() {
        let table = styles();
        let lines = TreeSerializer::new(&table)
            .serialize(&tree(json!({ "A": { "x": {}, "y": {} }, "B": {} })), &config(0))
            .unwrap();

        assert_eq!(lines, vec!["* A <<root>>", "* B <<root>>"]);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(2, 3)]
    #[case(3, 4)]
    #[case(999, 4)]
    fn given_depth_budget_when_serializing_then_cuts_below_that_level(
        #[case] max_depth: usize,
        #[case] expected_lines: usize,
    ) {
        let table = styles();
        let nested = tree(json!({ "l0": { "l1": { "l2": { "l3": {} } } } }));
        let lines = TreeSerializer::new(&table)
            .serialize(&nested, &config(max_depth))
            .unwrap();

        assert_eq!(lines.len(), expected_lines);
        for (level, line) in lines.iter().enumerate() {
            assert!(line.starts_with(&format!("{}* l{level}", "\t".repeat(level))));
        }
    }

    #[test]
    fn given_root_label_when_serializing_then_root_is_the_only_root_tag() {
        let table = styles();
        let cfg = RenderConfig {
            root_label: Some("Limitations".to_string()),
            ..RenderConfig::default()
        };
        let lines = TreeSerializer::new(&table)
            .serialize(&tree(json!({ "A": { "x": {} }, "B": {} })), &cfg)
            .unwrap();

        assert_eq!(lines, vec!["* Limitations <<root>>", "\t* A", "\t\t* x", "\t* B"]);
        assert_eq!(lines.iter().filter(|l| l.contains("<<root>>")).count(), 1);
    }

    #[test]
    fn given_root_label_and_zero_depth_then_label_does_not_use_budget() {
        let table = styles();
        let cfg = RenderConfig {
            max_depth: 0,
            root_label: Some("R".to_string()),
            side_switch: None,
        };
        let lines = TreeSerializer::new(&table)
            .serialize(&tree(json!({ "A": { "x": {} }, "B": {} })), &cfg)
            .unwrap();

        assert_eq!(lines, vec!["* R <<root>>", "\t* A", "\t* B"]);
    }

    #[test]
    fn given_dated_nodes_when_serializing_then_tags_follow_thresholds() {
        let table = styles();
        let cfg = RenderConfig {
            root_label: Some("R".to_string()),
            ..RenderConfig::default()
        };
        let input = tree(json!({
            "old": { "_date": "2024-01-01" },
            "mid": { "_date": "2025-04-01", "child": { "_date": "2025-09-15" } },
            "epoch": { "_date": "1970-01-01" }
        }));
        let lines = TreeSerializer::new(&table).serialize(&input, &cfg).unwrap();

        assert_eq!(
            lines,
            vec![
                "* R <<root>>",
                "\t* old",
                "\t* mid <<first>>",
                "\t\t* child <<second>>",
                "\t* epoch",
            ]
        );
    }

    #[test]
    fn given_top_level_dates_without_root_label_then_root_tag_wins() {
        let table = styles();
        let lines = TreeSerializer::new(&table)
            .serialize(
                &tree(json!({ "A": { "_date": "2025-10-01", "x": { "_date": "2025-10-01" } } })),
                &RenderConfig::default(),
            )
            .unwrap();

        assert_eq!(lines, vec!["* A <<root>>", "\t* x <<second>>"]);
    }

    #[test]
    fn given_dates_disabled_when_serializing_then_only_root_tags() {
        let lines = TreeSerializer::without_dates()
            .serialize(
                &tree(json!({ "A": { "x": { "_date": "2025-13-40" } } })),
                &RenderConfig::default(),
            )
            .unwrap();

        assert_eq!(lines, vec!["* A <<root>>", "\t* x"]);
    }

    #[test]
    fn given_malformed_date_when_serializing_then_aborts() {
        let table = styles();
        let result = TreeSerializer::new(&table).serialize(
            &tree(json!({ "A": { "ok": {}, "bad": { "_date": "2025-13-40" } } })),
            &RenderConfig::default(),
        );

        assert_eq!(
            result,
            Err(DomainError::MalformedDate("2025-13-40".to_string()))
        );
    }

    #[test]
    fn given_side_switch_index_then_directive_follows_that_block() {
        let table = styles();
        let cfg = RenderConfig {
            root_label: Some("R".to_string()),
            side_switch: Some(SideSwitch::Index(0)),
            ..RenderConfig::default()
        };
        let lines = TreeSerializer::new(&table)
            .serialize(&tree(json!({ "A": { "x": {} }, "B": {}, "C": {} })), &cfg)
            .unwrap();

        assert_eq!(
            lines,
            vec!["* R <<root>>", "\t* A", "\t\t* x", SIDE_SWITCH_DIRECTIVE, "\t* B", "\t* C"]
        );
    }

    #[rstest]
    #[case(0, None)]
    #[case(1, Some(0))]
    #[case(2, Some(0))]
    #[case(3, Some(1))]
    #[case(4, Some(1))]
    #[case(5, Some(2))]
    fn given_half_then_resolves_to_ceil_half_minus_one(
        #[case] count: usize,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(SideSwitch::Half.position(count), expected);
    }

    #[test]
    fn given_half_with_five_children_then_directive_after_third() {
        let table = styles();
        let cfg = RenderConfig {
            root_label: Some("R".to_string()),
            side_switch: Some(SideSwitch::Half),
            ..RenderConfig::default()
        };
        let lines = TreeSerializer::new(&table)
            .serialize(&tree(json!({ "a": {}, "b": {}, "c": {}, "d": {}, "e": {} })), &cfg)
            .unwrap();

        let directive = lines.iter().position(|l| l == SIDE_SWITCH_DIRECTIVE).unwrap();
        assert_eq!(lines[directive - 1], "\t* c");
        assert_eq!(lines.iter().filter(|l| *l == SIDE_SWITCH_DIRECTIVE).count(), 1);
    }

    #[test]
    fn given_side_switch_out_of_range_then_no_directive() {
        let table = styles();
        let cfg = RenderConfig {
            root_label: Some("R".to_string()),
            side_switch: Some(SideSwitch::Index(7)),
            ..RenderConfig::default()
        };
        let lines = TreeSerializer::new(&table)
            .serialize(&tree(json!({ "a": {}, "b": {} })), &cfg)
            .unwrap();

        assert!(!lines.iter().any(|l| l == SIDE_SWITCH_DIRECTIVE));
    }

    #[test]
    fn given_no_root_label_then_side_switch_applies_to_each_first_level_group() {
        let table = styles();
        let cfg = RenderConfig {
            side_switch: Some(SideSwitch::Index(0)),
            ..RenderConfig::default()
        };
        let lines = TreeSerializer::new(&table)
            .serialize(
                &tree(json!({ "A": { "x": { "deep": {} }, "y": {} }, "B": { "z": {} } })),
                &cfg,
            )
            .unwrap();

        assert_eq!(
            lines,
            vec![
                "* A <<root>>",
                "\t* x",
                "\t\t* deep",
                SIDE_SWITCH_DIRECTIVE,
                "\t* y",
                "* B <<root>>",
                "\t* z",
                SIDE_SWITCH_DIRECTIVE,
            ]
        );
    }

    #[test]
    fn given_bare_date_value_then_label_emitted_without_children() {
        let table = styles();
        let lines = TreeSerializer::new(&table)
            .serialize(&tree(json!({ "A": { "x": "2025-01-01" } })), &RenderConfig::default())
            .unwrap();
        assert_eq!(lines, vec!["* A <<root>>", "\t* x"]);

        let bare = TreeNode::Date("2025-01-01".to_string());
        assert!(TreeSerializer::new(&table)
            .serialize(&bare, &RenderConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn given_same_input_twice_then_output_is_identical() {
        let table = styles();
        let input = tree(json!({ "A": { "x": { "_date": "2025-05-01" } }, "B": {} }));
        let cfg = RenderConfig {
            root_label: Some("R".to_string()),
            side_switch: Some(SideSwitch::Half),
            ..RenderConfig::default()
        };
        let serializer = TreeSerializer::new(&table);
        assert_eq!(
            serializer.serialize(&input, &cfg).unwrap(),
            serializer.serialize(&input, &cfg).unwrap()
        );
    }

    #[rstest]
    #[case("half", SideSwitch::Half)]
    #[case("3", SideSwitch::Index(3))]
    fn given_text_when_parsing_side_switch_then_accepts(#[case] text: &str, #[case] expected: SideSwitch) {
        assert_eq!(text.parse::<SideSwitch>().unwrap(), expected);
    }

    #[test]
    fn given_unknown_keyword_when_parsing_side_switch_then_errors() {
        assert!("middle".parse::<SideSwitch>().is_err());
    }
}
