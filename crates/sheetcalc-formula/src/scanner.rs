//! Depth- and quote-aware scanning of formula text
//!
//! Every split the parser performs (arguments by `,`, operands by an
//! operator) goes through [`top_level`], so a separator inside parentheses or
//! inside a string literal is never a split point.

/// Characters of `text` that sit outside every parenthesis pair and every
/// string literal, with their byte offsets
///
/// Parentheses and quote characters themselves are never yielded. A doubled
/// quote inside a literal toggles the string state twice, so escapes need no
/// special handling.
pub fn top_level(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut depth: i32 = 0;
    let mut in_string = false;
    text.char_indices().filter(move |&(_, c)| match c {
        '"' => {
            in_string = !in_string;
            false
        }
        '(' if !in_string => {
            depth += 1;
            false
        }
        ')' if !in_string => {
            depth -= 1;
            false
        }
        _ => depth == 0 && !in_string,
    })
}

/// Split an argument list at top-level commas; each piece is trimmed
///
/// An empty list yields no arguments; `1,,2` yields an empty middle argument.
pub fn split_args(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut start = 0;
    for (i, _) in top_level(text).filter(|&(_, c)| c == ',') {
        args.push(text[start..i].trim());
        start = i + 1;
    }
    args.push(text[start..].trim());
    args
}

/// Whether every `(` outside string literals has a matching `)`
pub fn parens_balanced(text: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    for c in text.chars() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Whether the `(` at byte offset `open` is closed by the last character
/// of `text`
pub fn closes_at_end(text: &str, open: usize) -> bool {
    if !text[open..].starts_with('(') || !text.ends_with(')') {
        return false;
    }
    let last = text.len() - 1;
    let mut depth = 0;
    let mut in_string = false;
    for (i, c) in text[open..].char_indices() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return open + i == last;
                }
            }
            _ => {}
        }
    }
    false
}

/// Last non-whitespace character before byte offset `pos`
pub fn preceding_char(text: &str, pos: usize) -> Option<char> {
    text[..pos].trim_end().chars().next_back()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_top_level_skips_nested() {
        let found: Vec<char> = top_level("1+SUM(2+3)&\"a+b\"").map(|(_, c)| c).collect();
        assert_eq!(found, vec!['1', '+', 'S', 'U', 'M', '&']);
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("1, 2 ,3"), vec!["1", "2", "3"]);
        assert_eq!(
            split_args("A1:A3, SUM(1,2), \"x,y\""),
            vec!["A1:A3", "SUM(1,2)", "\"x,y\""]
        );
        assert_eq!(split_args("1,,2"), vec!["1", "", "2"]);
        assert!(split_args("  ").is_empty());
    }

    #[test]
    fn test_escaped_quotes_stay_inside_literal() {
        assert_eq!(split_args("\"a\"\",\"\"b\",c"), vec!["\"a\"\",\"\"b\"", "c"]);
    }

    #[test]
    fn test_parens_balanced() {
        assert!(parens_balanced("SUM(1,(2))"));
        assert!(parens_balanced("\"(\""));
        assert!(!parens_balanced("SUM(1,2"));
        assert!(!parens_balanced(")("));
    }

    #[test]
    fn test_closes_at_end() {
        assert!(closes_at_end("SUM(1,2)", 3));
        assert!(!closes_at_end("SUM(A1)+SUM(A2)", 3));
        assert!(closes_at_end("(1+2)", 0));
        assert!(!closes_at_end("(1)+(2)", 0));
        assert!(closes_at_end("F(\")\")", 1));
    }

    #[test]
    fn test_preceding_char() {
        assert_eq!(preceding_char("2 * -3", 4), Some('*'));
        assert_eq!(preceding_char("-3", 0), None);
    }
}
