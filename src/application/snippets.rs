//! LaTeX figure snippets for rendered views.

/// Escape characters with special meaning in LaTeX text.
pub fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\\' => escaped.push_str("\\textbackslash{}"),
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\textasciicircum{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A `figure` environment including `image` with a caption and a
/// `fig:mindmap-<stem>` label.
pub fn figure_snippet(image: &str, caption: &str, stem: &str) -> String {
    format!(
        "\\begin{{figure}}[htbp]\n\
         \x20 \\centering\n\
         \x20 \\includegraphics[width=\\textwidth]{{{image}}}\n\
         \x20 \\caption{{{caption}}}\n\
         \x20 \\label{{fig:mindmap-{stem}}}\n\
         \\end{{figure}}\n",
        caption = escape_latex(caption),
    )
}
