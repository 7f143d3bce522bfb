//! Fixed-width text wrapping for table cells and body text.

/// Greedy word wrap at `width` characters.
///
/// Whitespace runs collapse to single spaces. Words longer than `width` are
/// broken across lines, so no returned line is ever longer than `width`.
/// Blank input yields no lines.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
        }

        while word_len > width {
            let split = word
                .char_indices()
                .nth(width)
                .map_or(word.len(), |(index, _)| index);
            lines.push(word[..split].to_string());
            word = &word[split..];
            word_len -= width;
        }

        current.push_str(word);
        current_len = word_len;
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_words_greedily() {
        assert_eq!(
            wrap_text("Civil Judge   Senior Division, Pune", 16),
            vec!["Civil Judge", "Senior Division,", "Pune"]
        );
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let lines = wrap_text("MHAU030151912016MHAU030151912016 ok", 10);
        assert_eq!(
            lines,
            vec!["MHAU030151", "912016MHAU", "0301519120", "16 ok"]
        );
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_multibyte() {
        let lines = wrap_text("न्यायालय", 3);
        assert!(lines.iter().all(|l| l.chars().count() <= 3));
        assert_eq!(lines.concat(), "न्यायालय");
    }

    #[test]
    fn test_wrap_blank() {
        assert!(wrap_text("   \n ", 20).is_empty());
        assert_eq!(wrap_text("x", 0), vec!["x"]);
    }
}
