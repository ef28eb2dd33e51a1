//! File names for rendered views.

use std::sync::OnceLock;

use regex::Regex;

/// Characters spelled out before sanitizing.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('ä', "ae"),
    ('ö', "oe"),
    ('ü', "ue"),
    ('Ä', "Ae"),
    ('Ö', "Oe"),
    ('Ü', "Ue"),
    ('ß', "ss"),
];

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("separator regex is valid"))
}

/// Turn a category label into a file stem: `Geistige Einschränkungen` →
/// `geistige-einschraenkungen`.
///
/// Returns an empty string when nothing usable remains.
pub fn file_stem(label: &str) -> String {
    let mut spelled = String::with_capacity(label.len());
    for c in label.chars() {
        match SUBSTITUTIONS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => spelled.push_str(to),
            None => spelled.push(c),
        }
    }
    let lowered = spelled.to_lowercase();
    separators()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
