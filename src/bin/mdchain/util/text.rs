/// Greedy word wrap to `width` columns; always returns at least one line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

/// Shortens `s` to `max_len` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max_len: usize) -> String {
    match max_len {
        0 => String::new(),
        _ if s.chars().count() <= max_len => s.to_string(),
        1 => "…".to_string(),
        _ => {
            let mut out: String = s.chars().take(max_len - 1).collect();
            out.push('…');
            out
        }
    }
}

/// Comma-separated label list, or a dash when empty.
pub fn label_list<S: AsRef<str>>(labels: &[S]) -> String {
    if labels.is_empty() {
        return "-".to_string();
    }
    labels
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_short_messages_on_one_line() {
        assert_eq!(wrap("frame 11 is out of bounds", 40), vec!["frame 11 is out of bounds"]);
    }

    #[test]
    fn wrap_breaks_between_words() {
        assert_eq!(
            wrap("missing required field duration", 16),
            vec!["missing required", "field duration"]
        );
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("propeller", 20), "propeller");
        assert_eq!(truncate("propeller", 9), "propeller");
        assert_eq!(truncate("propeller_20240101", 8), "propell…");
        assert_eq!(truncate("αβγδε", 3), "αβ…");
    }

    #[test]
    fn label_list_joins_or_dashes() {
        assert_eq!(label_list(&["A", "C"]), "A, C");
        assert_eq!(label_list::<String>(&[]), "-");
    }
}
