//! Minimal comma separated codec for the activity file. Unquoted lines split on every comma,
//! which matches files written before quoting was introduced.

pub const HEADER: &str = "Day,Start Time,End Time,Activity";

/// Quotes a field when it would otherwise break the row apart. Line breaks can't be represented
/// in a line based file, so they become spaces.
pub fn escape_field(value: &str) -> String {
    let value = value.replace(['\r', '\n'], " ");
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

pub fn join_fields<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|v| escape_field(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a single line into fields. Quotes only have special meaning at the start of a field.
/// An unterminated quote swallows the rest of the line.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if current.is_empty() => quoted = true,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::{escape_field, join_fields, split_line};

    #[test]
    fn test_split_plain_line() {
        assert_eq!(
            split_line("Mon,09:00,10:00,Work"),
            ["Mon", "09:00", "10:00", "Work"]
        );
    }

    #[test]
    fn test_split_short_line() {
        assert_eq!(split_line("Mon,09:00"), ["Mon", "09:00"]);
        assert_eq!(split_line("Mon,09:00,,"), ["Mon", "09:00", "", ""]);
    }

    #[test]
    fn test_split_quoted_fields() {
        assert_eq!(
            split_line(r#"Mon,09:00,,"Coffee, then ""email""""#),
            ["Mon", "09:00", "", r#"Coffee, then "email""#]
        );
    }

    #[test]
    fn test_quote_inside_field_is_literal() {
        assert_eq!(split_line(r#"Mon,09:00,,say "hi""#)[3], r#"say "hi""#);
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("Work"), "Work");
        assert_eq!(escape_field("Gym, legs"), "\"Gym, legs\"");
        assert_eq!(escape_field("a \"b\""), "\"a \"\"b\"\"\"");
        assert_eq!(escape_field("two\nlines"), "two lines");
    }

    #[test]
    fn test_join_then_split_keeps_commas() {
        let fields = ["Mon", "09:00", "", "Gym, then \"stretching\""];
        assert_eq!(split_line(&join_fields(&fields)), fields);
    }
}
