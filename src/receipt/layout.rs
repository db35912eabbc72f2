//! Fixed-width text layout helpers.
//!
//! Widths are counted in characters, which equals printed columns because the
//! stream is encoded one byte per character.

/// Printed width of `s` in columns.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Greedy word wrap.
///
/// Lines that already fit are returned untouched, including any leading
/// spaces. Longer lines are re-flowed on whitespace; a word is never split,
/// so a single word wider than `width` ends up alone on an overlong line.
///
/// ```
/// use blueslip::receipt::layout::wrap;
///
/// assert_eq!(wrap("short", 10), vec!["short"]);
/// assert_eq!(wrap("one two three four", 9), vec!["one two", "three", "four"]);
/// ```
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    if char_len(line) <= width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if char_len(&current) + 1 + char_len(word) <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap `text` into `width - indent` columns and indent every resulting line.
pub fn wrap_indented(text: &str, width: usize, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    wrap(text, width.saturating_sub(indent).max(1))
        .into_iter()
        .map(|line| format!("{}{}", pad, line))
        .collect()
}

/// Left-pad `text` so it sits in the middle of `width` columns.
pub fn center(text: &str, width: usize) -> String {
    let len = char_len(text);
    if len >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((width - len) / 2), text)
}

/// Left-pad `text` so its last character lands on column `width`.
pub fn align_right(text: &str, width: usize) -> String {
    let len = char_len(text);
    if len >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat(width - len), text)
}

/// A label and a right-aligned amount on one line.
///
/// The filler is never less than one space, so an oversized pair still reads
/// as two fields.
///
/// ```
/// use blueslip::receipt::layout::money_line;
///
/// assert_eq!(money_line("Total", "9.50", 16), "Total       9.50");
/// assert_eq!(money_line("Subtotal", "1,000.00", 12), "Subtotal 1,000.00");
/// ```
pub fn money_line(label: &str, amount: &str, width: usize) -> String {
    let filler = width
        .saturating_sub(char_len(label) + char_len(amount))
        .max(1);
    format!("{}{}{}", label, " ".repeat(filler), amount)
}

/// A full-width rule made of `ch`.
pub fn separator(ch: char, width: usize) -> String {
    std::iter::repeat_n(ch, width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_passthrough_keeps_indent() {
        assert_eq!(wrap("  + Oat milk", 32), vec!["  + Oat milk"]);
    }

    #[test]
    fn test_wrap_exact_width() {
        let line = "a".repeat(32);
        assert_eq!(wrap(&line, 32), vec![line.clone()]);
    }

    #[test]
    fn test_wrap_long_word_is_not_split() {
        let word = "x".repeat(40);
        let text = format!("tiny {} end", word);
        assert_eq!(wrap(&text, 32), vec!["tiny".to_string(), word, "end".to_string()]);
    }

    #[test]
    fn test_wrap_blank_overlong_line() {
        assert_eq!(wrap(&" ".repeat(40), 32), vec![String::new()]);
    }

    #[test]
    fn test_wrap_indented() {
        assert_eq!(
            wrap_indented("* no onions please and extra pickles", 20, 2),
            vec!["  * no onions please", "  and extra pickles"]
        );
    }

    #[test]
    fn test_center_and_right() {
        assert_eq!(center("abc", 9), "   abc");
        assert_eq!(center("abcd", 9), "  abcd");
        assert_eq!(center("too long", 4), "too long");
        assert_eq!(align_right("42", 6), "    42");
    }

    #[test]
    fn test_money_line_lands_on_last_column() {
        for width in [32, 48, 64] {
            let line = money_line("Subtotal", "123.45", width);
            assert_eq!(char_len(&line), width);
            assert!(line.ends_with("123.45"));
        }
    }

    #[test]
    fn test_money_line_minimum_filler() {
        assert_eq!(money_line("abcdef", "1.00", 10), "abcdef 1.00");
        assert_eq!(money_line("abcdefgh", "1.00", 10), "abcdefgh 1.00");
    }

    #[test]
    fn test_separator() {
        assert_eq!(separator('-', 5), "-----");
    }
}
