fn is_stripped(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

/// Strip control characters, trim, then truncate to `max_length` characters.
///
/// Control characters go first and the tail is re-trimmed after truncation, which keeps
/// the function idempotent.
pub fn sanitize_input(input: &str, max_length: Option<usize>) -> String {
    let stripped: String = input.chars().filter(|c| !is_stripped(*c)).collect();
    let trimmed = stripped.trim();

    match max_length {
        Some(limit) if trimmed.chars().count() > limit => trimmed
            .chars()
            .take(limit)
            .collect::<String>()
            .trim_end()
            .to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_strips_controls() {
        assert_eq!(sanitize_input("  hello\u{0} world\t ", None), "hello world");
        assert_eq!(sanitize_input("\u{7}bell\u{85}", None), "bell");
        assert_eq!(sanitize_input("", None), "");
    }

    #[test]
    fn truncates_by_characters() {
        assert_eq!(sanitize_input("ñandú", Some(3)), "ñan");
        assert_eq!(sanitize_input("abc", Some(10)), "abc");
        assert_eq!(sanitize_input("abc", Some(0)), "");
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        let samples = [
            " \u{0} a",
            "ab c",
            "  padded  ",
            "tab\tseparated\nlines",
            "x\u{1f} \u{7f}",
            "",
        ];
        for sample in samples {
            for limit in [None, Some(0), Some(1), Some(3), Some(64)] {
                let once = sanitize_input(sample, limit);
                assert_eq!(sanitize_input(&once, limit), once, "{sample:?} {limit:?}");
            }
        }
    }
}
