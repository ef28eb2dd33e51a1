//! Complete PlantUML mindmap documents from serialized bodies.

/// Join header, body and footer lines with newlines.
pub fn assemble<S: AsRef<str>>(body: &[S], header: &[&str], footer: &[&str]) -> String {
    header
        .iter()
        .copied()
        .chain(body.iter().map(|line| line.as_ref()))
        .chain(footer.iter().copied())
        .collect::<Vec<_>>()
        .join("\n")
}

const HEADER: &[&str] = &[
    "@startmindmap",
    "<style>",
    "mindmapDiagram {",
    "  node { BackgroundColor #FFFFFF; LineColor #444444 }",
    "  .root { BackgroundColor #F4D58D; FontStyle bold }",
    "  .added { BackgroundColor #D9EAD3 }",
    "  .new { BackgroundColor #A9D18E }",
    "}",
    "</style>",
];

const FOOTER: &[&str] = &["@endmindmap"];

/// Fixed preamble and terminator wrapped around every body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    header: Vec<&'static str>,
    footer: Vec<&'static str>,
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self {
            header: HEADER.to_vec(),
            footer: FOOTER.to_vec(),
        }
    }
}

impl DocumentTemplate {
    pub fn assemble<S: AsRef<str>>(&self, body: &[S]) -> String {
        assemble(body, &self.header, &self.footer)
    }

    pub fn header(&self) -> &[&'static str] {
        &self.header
    }

    pub fn footer(&self) -> &[&'static str] {
        &self.footer
    }
}
