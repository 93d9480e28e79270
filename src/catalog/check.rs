use super::attr::{self, Attr};

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub name: String,
    /// Boolean expression text.
    pub expr: String,
    /// Owning table (non-owning back reference by name).
    pub table: String,
    pub attrs: Vec<Attr>,
}

impl Check {
    pub fn new(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: expr.into(),
            table: String::new(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        attr::set(&mut self.attrs, attr);
        self
    }

    /// Column names from `candidates` that appear as identifiers in the expression.
    /// Derived only: the expression text is authoritative.
    pub fn referenced_columns<'a>(&self, candidates: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        let idents: Vec<String> = identifiers(&self.expr)
            .map(|s| s.trim_matches('"').to_ascii_lowercase())
            .collect();
        candidates
            .into_iter()
            .filter(|c| idents.iter().any(|i| i == &c.to_ascii_lowercase()))
            .collect()
    }
}

/// Identifier-like tokens of an expression, skipping string literals.
fn identifiers(expr: &str) -> impl Iterator<Item = &str> {
    let mut out = Vec::new();
    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c == '\'' {
            i += 1;
            while i < bytes.len() && bytes[i] as char != '\'' {
                i += 1;
            }
            i += 1;
        } else if c == '"' {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i] as char != '"' {
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            out.push(&expr[start..i]);
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            out.push(&expr[start..i]);
        } else {
            i += 1;
        }
    }
    out.into_iter()
}
