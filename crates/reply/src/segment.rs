/// A candidate split delimiter.
///
/// `keep` is the number of leading delimiter bytes that stay with the
/// text before the cut: sentence and clause punctuation stays attached
/// to the segment it ends, while whitespace delimiters are cut before
/// and later consumed by the planner's leading-whitespace trim.
struct Delimiter {
    pattern: &'static str,
    keep: usize,
}

impl Delimiter {
    const fn new(pattern: &'static str, keep: usize) -> Self {
        Self { pattern, keep }
    }
}

/// Split delimiters, strongest boundary first: paragraph break, line
/// break, sentence-ending punctuation, clause-ending punctuation, plain
/// space. All patterns are ASCII, so byte offsets returned by `rfind`
/// are always valid cut points in UTF-8 text.
const DELIMITERS: &[Delimiter] = &[
    Delimiter::new("\n\n", 0),
    Delimiter::new("\n", 0),
    Delimiter::new(". ", 1),
    Delimiter::new("! ", 1),
    Delimiter::new("? ", 1),
    Delimiter::new(", ", 1),
    Delimiter::new("; ", 1),
    Delimiter::new(": ", 1),
    Delimiter::new(" ", 0),
];

/// Find the best cut index for `text` so the head fits in `max_len` bytes.
///
/// Every delimiter whose occurrence fits entirely within the first
/// `max_len` bytes contributes a candidate cut; the candidate closest to
/// `max_len` wins, with delimiter strength breaking ties. If no delimiter
/// occurs in the window, the cut is a hard break at `max_len`, clamped to
/// a character boundary.
///
/// The returned index is always in `1..=max_len` (after boundary
/// clamping) and never exceeds `text.len()`. Callers only invoke this
/// when `text.len() > max_len`.
pub fn find_boundary(text: &str, max_len: usize) -> usize {
    debug_assert!(max_len > 0);
    debug_assert!(text.len() > max_len);

    let window_end = text.floor_char_boundary(max_len);
    if window_end == 0 {
        // max_len is narrower than the first character; cut after it.
        return text
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(text.len());
    }

    let window = &text[..window_end];
    let mut best: Option<usize> = None;
    for delimiter in DELIMITERS {
        let Some(pos) = window.rfind(delimiter.pattern) else {
            continue;
        };
        let cut = pos + delimiter.keep;
        if cut == 0 {
            continue;
        }
        // Strictly greater, so an earlier (stronger) delimiter wins ties.
        if best.is_none_or(|b| cut > b) {
            best = Some(cut);
        }
    }

    best.unwrap_or(window_end)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Hello! How are you?", 10, 6)] // sentence break, "Hello!" kept whole
    #[case("ab. cd ef", 4, 3)] // ". " fits the 4-byte window, period stays
    #[case("Great, let's dive.", 10, 6)] // clause break after the comma
    #[case("hello world again", 11, 5)] // last space inside the window wins
    #[case("one\n\ntwo three four", 9, 8)] // later space beats earlier breaks
    fn picks_latest_fitting_delimiter(
        #[case] text: &str,
        #[case] max_len: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(find_boundary(text, max_len), expected);
    }

    #[test]
    fn sentence_break_wins_tie_with_space() {
        // "! " at 5 yields cut 6; " " at 6 yields cut 6 as well.
        let cut = find_boundary("Hello! How are you?", 10);
        assert_eq!(cut, 6);
        assert_eq!(&"Hello! How are you?"[..cut], "Hello!");
    }

    #[test]
    fn hard_break_when_no_delimiter() {
        assert_eq!(find_boundary("abcdefghij", 5), 5);
    }

    #[test]
    fn hard_break_clamps_to_char_boundary() {
        // Five two-byte characters; byte 5 falls inside the third one.
        assert_eq!(find_boundary("ééééé", 5), 4);
    }

    #[test]
    fn delimiter_straddling_window_edge_is_ignored() {
        // ". " starts at byte 5 but its space lands outside the 6-byte
        // window, so the cut is a hard break.
        assert_eq!(find_boundary("hello. world", 6), 6);
    }

    #[test]
    fn leading_space_never_yields_zero_cut() {
        assert_eq!(find_boundary(" abcdefg", 4), 4);
    }

    #[test]
    fn max_len_smaller_than_first_char_cuts_one_char() {
        assert_eq!(find_boundary("émile wrote", 1), 2);
    }
}
