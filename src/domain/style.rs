//! Date-threshold styling
//!
//! Nodes carry the date they were introduced. The style table maps threshold
//! dates to style tags; a node gets the tag of the most recent threshold on
//! or before its date.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Historical "no date" marker, always resolves to no tag.
pub const EPOCH_SENTINEL: &str = "1970-01-01";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date shape regex is valid"))
}

/// Check the `YYYY-MM-DD` shape only (no calendar validation).
pub fn is_date_shaped(value: &str) -> bool {
    date_shape().is_match(value)
}

/// Parse a `YYYY-MM-DD` date, rejecting both bad shapes and impossible dates.
pub fn parse_date(value: &str) -> DomainResult<NaiveDate> {
    if !is_date_shaped(value) {
        return Err(DomainError::MalformedDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| DomainError::MalformedDate(value.to_string()))
}

/// One configured threshold: nodes introduced on or after `since` get `tag`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StyleRule {
    pub since: String,
    #[serde(default)]
    pub tag: Option<String>,
}

impl StyleRule {
    pub fn new(since: &str, tag: Option<&str>) -> Self {
        Self {
            since: since.to_string(),
            tag: tag.map(str::to_string),
        }
    }
}

/// Ascending threshold table, always starting with a beginning-of-time entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTable {
    entries: Vec<(NaiveDate, Option<String>)>,
}

impl StyleTable {
    /// Build a table from rules in any order.
    ///
    /// Empty tags count as "no tag". A sentinel entry mapping the earliest
    /// representable date to no tag is added unless a rule already covers it.
    pub fn new(rules: &[StyleRule]) -> DomainResult<Self> {
        let mut entries = rules
            .iter()
            .map(|rule| {
                let since = parse_date(&rule.since)?;
                let tag = rule.tag.clone().filter(|t| !t.is_empty());
                Ok((since, tag))
            })
            .collect::<DomainResult<Vec<_>>>()?;
        entries.sort_by_key(|(since, _)| *since);

        if entries.first().map_or(true, |(since, _)| *since > NaiveDate::MIN) {
            entries.insert(0, (NaiveDate::MIN, None));
        }
        Ok(Self { entries })
    }

    /// Rules of the built-in table.
    pub fn builtin_rules() -> Vec<StyleRule> {
        vec![
            StyleRule::new("2025-06-01", Some("added")),
            StyleRule::new("2025-10-01", Some("new")),
        ]
    }

    /// Distinct tags in threshold order.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in self.entries.iter().filter_map(|(_, t)| t.as_deref()) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Tag active at `date`.
    ///
    /// `None` and the epoch sentinel resolve to no tag. Anything else must be
    /// a real `YYYY-MM-DD` date.
    pub fn resolve(&self, date: Option<&str>) -> DomainResult<Option<&str>> {
        let Some(date) = date else {
            return Ok(None);
        };
        if date == EPOCH_SENTINEL {
            return Ok(None);
        }
        let date = parse_date(date)?;

        let mut active = None;
        for (threshold, tag) in &self.entries {
            if *threshold > date {
                return Ok(active);
            }
            active = tag.as_deref();
        }
        Ok(active)
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new(&Self::builtin_rules()).expect("built-in style rules are valid dates")
    }
}
