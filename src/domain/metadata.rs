//! Metadata block grammar
//!
//! A task line may end with a parenthesized, comma-separated list of
//! `key: value` entries:
//!
//! ```text
//! (phase: setup, type: backend, depends: T001, T002, priority: high, effort: 3, tags: api, auth)
//! ```
//!
//! A segment without `key:` continues the previous list-valued entry
//! (`depends`, `tags`). Anything else that does not fit is a malformed block.

use super::document::WarningKind;
use super::id::TaskId;
use super::task::Task;

/// Where the metadata block sits in the text after the task ID
#[derive(Debug, PartialEq)]
pub(crate) enum Trailing<'a> {
    /// No metadata block; the whole text is the description
    None,
    /// A balanced block: description before it, block content inside
    Block { description: &'a str, inner: &'a str },
    /// Looks like metadata but the parentheses do not balance
    Unbalanced { description: &'a str },
}

/// Locates the trailing metadata block in `rest`
pub(crate) fn split_trailing(rest: &str) -> Trailing<'_> {
    let rest = rest.trim_end();

    if rest.ends_with(')') {
        let mut depth = 0usize;
        for (idx, c) in rest.char_indices().rev() {
            match c {
                ')' => depth += 1,
                '(' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = &rest[idx + 1..rest.len() - 1];
                        if !inner.contains(':') {
                            return match unterminated(&rest[..idx]) {
                                Some(open) => Trailing::Unbalanced {
                                    description: rest[..open].trim_end(),
                                },
                                None => Trailing::None,
                            };
                        }
                        return Trailing::Block {
                            description: rest[..idx].trim_end(),
                            inner,
                        };
                    }
                }
                _ => {}
            }
        }

        // Ran out of open parens
        return match rest.find('(') {
            Some(open) if rest[open..].contains(':') => Trailing::Unbalanced {
                description: rest[..open].trim_end(),
            },
            _ => Trailing::None,
        };
    }

    match unterminated(rest) {
        Some(open) => Trailing::Unbalanced {
            description: rest[..open].trim_end(),
        },
        None => Trailing::None,
    }
}

/// Finds an unterminated block like `(phase: setup` at the end of `text`
fn unterminated(text: &str) -> Option<usize> {
    let open = text.rfind('(')?;
    let tail = &text[open..];
    (!tail.contains(')') && tail.contains(':')).then_some(open)
}

/// One `key: value[, value...]` entry
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entry {
    pub key: String,
    pub values: Vec<String>,
}

fn is_key(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_list_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "depends" | "deps" | "depends_on" | "dependencies" | "tags" | "tag"
    )
}

/// Splits block content into entries, or returns the reason it is malformed
pub(crate) fn parse_entries(inner: &str) -> Result<Vec<Entry>, String> {
    let mut entries: Vec<Entry> = Vec::new();

    for segment in inner.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        if let Some((key, value)) = segment.split_once(':') {
            let key = key.trim();
            if is_key(key) {
                let value = value.trim();
                if value.is_empty() {
                    return Err(format!("missing value for '{key}'"));
                }
                entries.push(Entry {
                    key: key.to_string(),
                    values: vec![value.to_string()],
                });
                continue;
            }
            if entries.is_empty() {
                return Err(format!("invalid key '{key}'"));
            }
        }

        // Continuation of the previous list-valued entry
        match entries.last_mut() {
            Some(entry) if is_list_key(&entry.key) => entry.values.push(segment.to_string()),
            Some(entry) => {
                return Err(format!(
                    "unexpected '{segment}' after '{}' (expected 'key: value')",
                    entry.key
                ))
            }
            None => return Err(format!("expected 'key: value', found '{segment}'")),
        }
    }

    if entries.is_empty() {
        return Err("empty metadata block".to_string());
    }

    Ok(entries)
}

/// Applies parsed entries to a task, returning per-entry warnings
pub(crate) fn apply(task: &mut Task, entries: Vec<Entry>) -> Vec<WarningKind> {
    let mut warnings = Vec::new();

    for Entry { key, values } in entries {
        match key.to_ascii_lowercase().as_str() {
            "phase" => task.phase = Some(values.join(", ")),
            "type" | "kind" => task.task_type = Some(values.join(", ")),
            "depends" | "deps" | "depends_on" | "dependencies" => {
                for token in values.iter().flat_map(|v| v.split_whitespace()) {
                    if token == "-" || token.eq_ignore_ascii_case("none") {
                        continue;
                    }
                    match token.parse::<TaskId>() {
                        Ok(id) => {
                            task.add_dependency(id);
                        }
                        Err(_) => warnings.push(WarningKind::InvalidValue {
                            key: key.clone(),
                            value: token.to_string(),
                        }),
                    }
                }
            }
            "priority" => {
                let value = values.join(", ");
                match value.parse() {
                    Ok(priority) => task.priority = priority,
                    Err(_) => warnings.push(WarningKind::InvalidValue { key, value }),
                }
            }
            "effort" => {
                let value = values.join(", ");
                match value.parse::<u32>() {
                    Ok(effort) => task.effort = effort,
                    Err(_) => warnings.push(WarningKind::InvalidValue { key, value }),
                }
            }
            "tags" | "tag" => {
                for tag in values {
                    task.add_tag(tag);
                }
            }
            _ => {
                task.add_tag(format!("{}:{}", key, values.join(", ")));
                warnings.push(WarningKind::UnknownKey { key });
            }
        }
    }

    warnings
}
