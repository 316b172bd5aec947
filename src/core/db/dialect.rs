/// Dialect Module
///
/// Identifier quoting templates for procedure names, and the optional case
/// folding applied to the final name.
use serde::Deserialize;

/// Placeholder the procedure name is substituted into.
pub const NAME_PLACEHOLDER: &str = "{0}";

/// Quoting convention of a database vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `[name]`
    SqlServer,
    /// `` `name` ``
    MySql,
    /// `"name"`
    Postgres,
    /// `"name"`
    Sqlite,
}

impl Dialect {
    /// Quoting template for a single identifier.
    pub fn identifier_template(self) -> &'static str {
        match self {
            Dialect::SqlServer => "[{0}]",
            Dialect::MySql => "`{0}`",
            Dialect::Postgres | Dialect::Sqlite => "\"{0}\"",
        }
    }

    /// Quotes `identifier` with this dialect's template.
    pub fn quote(self, identifier: &str) -> String {
        self.identifier_template().replace(NAME_PLACEHOLDER, identifier)
    }

    /// Template for a procedure name, schema-qualified when a non-blank
    /// schema is given. The result still contains the `{0}` placeholder.
    pub fn base_command(self, schema: Option<&str>) -> String {
        let mut cmd = String::new();
        if let Some(schema) = schema.filter(|s| !s.trim().is_empty()) {
            cmd.push_str(&self.quote(schema));
            cmd.push('.');
        }
        cmd.push_str(self.identifier_template());
        cmd
    }
}

/// Case folding applied to the formatted procedure name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseTransform {
    #[default]
    None,
    Lower,
    Upper,
}

impl CaseTransform {
    pub fn apply(self, name: String) -> String {
        match self {
            CaseTransform::None => name,
            CaseTransform::Lower => name.to_lowercase(),
            CaseTransform::Upper => name.to_uppercase(),
        }
    }
}

/// Substitutes `name` into `base` and applies `case`.
pub fn format_procedure_name(base: &str, name: &str, case: CaseTransform) -> String {
    case.apply(base.replace(NAME_PLACEHOLDER, name))
}

/// Splits a possibly quoted, possibly schema-qualified identifier into its
/// parts, removing `[]`, backtick and double-quote delimiters. Doubled closing
/// delimiters inside a quoted part are unescaped.
pub fn split_identifier(qualified: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = qualified.trim().chars().peekable();

    while let Some(c) = chars.next() {
        let close = match c {
            '[' => Some(']'),
            '`' => Some('`'),
            '"' => Some('"'),
            _ => None,
        };

        match close {
            Some(close) => {
                while let Some(inner) = chars.next() {
                    if inner == close {
                        if chars.peek() == Some(&close) {
                            chars.next();
                            current.push(close);
                        } else {
                            break;
                        }
                    } else {
                        current.push(inner);
                    }
                }
            }
            None if c == '.' => parts.push(std::mem::take(&mut current)),
            None => current.push(c),
        }
    }

    parts.push(current);
    parts
}
