//! Command Line Parser
//!
//! Turns one line of the textual command surface into a [`Command`].
//! The grammar is deliberately forgiving: unrecognized lines are skipped,
//! and malformed clauses degrade to wildcard or no-op conditions instead
//! of surfacing an error.
//!
//! ```text
//! INSERT (alice, eng, 5)
//! SELECT field1, field3 WHERE field1=al* AND field3=5
//! UPDATE SET field2=mgmt WHERE field1=alice
//! DELETE WHERE field3=5
//! ```

use crate::command::{Assignments, Command, Predicate, Projection};

/// Parse a single input line; `None` means the line carries no command
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("--") {
        return None;
    }

    let keyword = line.split_whitespace().next()?;
    match keyword.to_ascii_uppercase().as_str() {
        "INSERT" => Some(parse_insert(line)),
        "SELECT" => Some(parse_select(line)),
        "UPDATE" => Some(parse_update(line)),
        "DELETE" => Some(parse_delete(line)),
        _ => None,
    }
}

/// `INSERT (field1, field2, field3)`
fn parse_insert(line: &str) -> Command {
    let inner = line
        .find('(')
        .map(|start| {
            let rest = &line[start + 1..];
            rest.find(')').map_or(rest, |end| &rest[..end])
        })
        .unwrap_or("");

    let mut values = inner.split(',').map(str::trim);
    let field1 = values.next().unwrap_or("").to_string();
    let field2 = values.next().unwrap_or("").to_string();
    let field3 = parse_int(values.next().unwrap_or(""));

    Command::Insert {
        field1,
        field2,
        field3,
    }
}

/// `SELECT [projection] WHERE [conditions]`
fn parse_select(line: &str) -> Command {
    let rest = &line["SELECT".len()..];
    let (before_where, where_part) = split_at_keyword(rest, "WHERE");

    let projection = Projection::from_names(
        before_where
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty()),
    );

    Command::Select {
        projection,
        predicate: parse_where(where_part),
    }
}

/// `UPDATE SET assignments WHERE [conditions]`
fn parse_update(line: &str) -> Command {
    let rest = &line["UPDATE".len()..];
    let (set_part, where_part) = split_at_keyword(rest, "WHERE");
    let set_part = match split_at_keyword(set_part, "SET") {
        (_, Some(after_set)) => after_set,
        // No SET clause at all: degrade to an empty assignment list.
        (_, None) => "",
    };

    Command::Update {
        predicate: parse_where(where_part),
        assignments: parse_assignments(set_part),
    }
}

/// `DELETE WHERE [conditions]`
fn parse_delete(line: &str) -> Command {
    let rest = &line["DELETE".len()..];
    let (_, where_part) = split_at_keyword(rest, "WHERE");

    Command::Delete {
        predicate: parse_where(where_part),
    }
}

/// Split input at the first occurrence of an ASCII keyword,
/// case-insensitively; the keyword itself is consumed
fn split_at_keyword<'a>(input: &'a str, keyword: &str) -> (&'a str, Option<&'a str>) {
    let upper = input.to_ascii_uppercase();
    match upper.find(keyword) {
        Some(pos) => (&input[..pos], Some(&input[pos + keyword.len()..])),
        None => (input, None),
    }
}

/// Parse a WHERE clause: `field1=v AND field2=v AND field3=n`
///
/// Absent conditions stay wildcards; tokens that are not `field=value`
/// are ignored.
fn parse_where(clause: Option<&str>) -> Predicate {
    let mut predicate = Predicate::any();
    let Some(clause) = clause else {
        return predicate;
    };

    for token in clause.split_whitespace() {
        if token.eq_ignore_ascii_case("AND") {
            continue;
        }
        let Some((field, value)) = token.split_once('=') else {
            continue;
        };

        match field.trim().to_ascii_lowercase().as_str() {
            "field1" => predicate.field1 = value.trim().to_string(),
            "field2" => predicate.field2 = value.trim().to_string(),
            "field3" => predicate.field3 = Some(parse_int(value)),
            _ => {}
        }
    }

    predicate
}

/// Parse a SET clause: `field1=v, field2=v, field3=n`
///
/// An empty value means "leave the field unchanged".
fn parse_assignments(clause: &str) -> Assignments {
    let mut assignments = Assignments::default();

    for part in clause.split(',') {
        let Some((field, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match field.trim().to_ascii_lowercase().as_str() {
            "field1" => assignments.field1 = Some(value.to_string()),
            "field2" => assignments.field2 = Some(value.to_string()),
            "field3" => assignments.field3 = Some(parse_int(value)),
            _ => {}
        }
    }

    assignments
}

/// Parse the leading decimal digits of a value; anything else yields 0
fn parse_int(value: &str) -> u32 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert() {
        let cmd = parse_line("INSERT (alice, eng, 5)").unwrap();
        assert_eq!(
            cmd,
            Command::Insert {
                field1: "alice".into(),
                field2: "eng".into(),
                field3: 5,
            }
        );
    }

    #[test]
    fn test_parse_insert_without_parens_degrades() {
        let cmd = parse_line("INSERT alice eng 5").unwrap();
        assert_eq!(
            cmd,
            Command::Insert {
                field1: String::new(),
                field2: String::new(),
                field3: 0,
            }
        );
    }

    #[test]
    fn test_parse_select_full() {
        let cmd = parse_line("SELECT field1, field3 WHERE field1=al* AND field3=5").unwrap();
        match cmd {
            Command::Select {
                projection,
                predicate,
            } => {
                assert!(projection.field1 && !projection.field2 && projection.field3);
                assert_eq!(predicate.field1, "al*");
                assert_eq!(predicate.field2, "");
                assert_eq!(predicate.field3, Some(5));
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_parse_select_bare() {
        let cmd = parse_line("SELECT").unwrap();
        match cmd {
            Command::Select {
                projection,
                predicate,
            } => {
                assert_eq!(projection, Projection::all());
                assert_eq!(predicate, Predicate::any());
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_parse_update() {
        let cmd = parse_line("UPDATE SET field2=mgmt WHERE field1=alice*").unwrap();
        match cmd {
            Command::Update {
                predicate,
                assignments,
            } => {
                assert_eq!(predicate.field1, "alice*");
                assert_eq!(assignments.field2.as_deref(), Some("mgmt"));
                assert_eq!(assignments.field1, None);
                assert_eq!(assignments.field3, None);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_parse_update_empty_set_value_means_unchanged() {
        let cmd = parse_line("UPDATE SET field1=, field3=9 WHERE field2=eng").unwrap();
        match cmd {
            Command::Update { assignments, .. } => {
                assert_eq!(assignments.field1, None);
                assert_eq!(assignments.field3, Some(9));
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_parse_delete() {
        let cmd = parse_line("DELETE WHERE field3=5").unwrap();
        assert_eq!(
            cmd,
            Command::Delete {
                predicate: Predicate {
                    field3: Some(5),
                    ..Predicate::any()
                }
            }
        );
    }

    #[test]
    fn test_unrecognized_lines_are_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("DROP TABLE users"), None);
    }

    #[test]
    fn test_malformed_where_degrades_to_wildcards() {
        let cmd = parse_line("DELETE WHERE gibberish !!").unwrap();
        assert_eq!(
            cmd,
            Command::Delete {
                predicate: Predicate::any()
            }
        );
    }

    #[test]
    fn test_non_numeric_field3_degrades_to_zero() {
        let cmd = parse_line("SELECT WHERE field3=abc").unwrap();
        match cmd {
            Command::Select { predicate, .. } => assert_eq!(predicate.field3, Some(0)),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_lowercase_keywords_accepted() {
        assert!(parse_line("insert (a, b, 1)").is_some());
        assert!(parse_line("select where field3=1").is_some());
    }
}
