//! Scanning of the text between syntax nodes.
//!
//! The oxc AST does not keep punctuation or keywords as nodes, so the gaps
//! between AST children are split here into tokens, whitespace and comments.

use oxc_span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece {
    Whitespace,
    Comment,
    Token,
}

/// Splits `source[start..end]` into whitespace, comments and tokens.
///
/// A token is a quoted string or a maximal run of characters that are neither
/// whitespace nor the start of a comment or string.
pub(crate) struct Scanner<'s> {
    source: &'s str,
    pos: usize,
    end: usize,
}

impl<'s> Scanner<'s> {
    pub(crate) fn new(source: &'s str, start: u32, end: u32) -> Self {
        let end = (end as usize).min(source.len());
        Self { source, pos: (start as usize).min(end), end }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..self.end]
    }

    fn eat_while(&mut self, mut f: impl FnMut(char) -> bool) {
        let rest = self.rest();
        let len = rest.char_indices().find(|&(_, c)| !f(c)).map_or(rest.len(), |(i, _)| i);
        self.pos += len;
    }

    fn eat_string(&mut self, quote: char) {
        let mut chars = self.rest().char_indices().skip(1);
        let mut len = self.rest().len();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                c if c == quote => {
                    len = i + c.len_utf8();
                    break;
                }
                _ => {}
            }
        }
        self.pos += len;
    }

    fn eat_token(&mut self) {
        let rest = self.rest();
        let mut len = rest.len();
        for (i, c) in rest.char_indices() {
            let tail = &rest[i..];
            let boundary = is_whitespace(c)
                || matches!(c, '"' | '\'' | '`')
                || tail.starts_with("//")
                || tail.starts_with("/*");
            if boundary && i > 0 {
                len = i;
                break;
            }
        }
        self.pos += len.max(rest.chars().next().map_or(0, char::len_utf8));
    }
}

impl Iterator for Scanner<'_> {
    type Item = (Piece, Span);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }
        let start = self.pos;
        let rest = self.rest();
        let first = rest.chars().next()?;

        let piece = if is_whitespace(first) {
            self.eat_while(is_whitespace);
            Piece::Whitespace
        } else if rest.starts_with("//") {
            self.eat_while(|c| c != '\n' && c != '\r');
            Piece::Comment
        } else if let Some(body) = rest.strip_prefix("/*") {
            self.pos += body.find("*/").map_or(rest.len(), |i| i + 4);
            Piece::Comment
        } else if matches!(first, '"' | '\'' | '`') {
            self.eat_string(first);
            Piece::Token
        } else {
            self.eat_token();
            Piece::Token
        };

        Some((piece, Span::new(start as u32, self.pos as u32)))
    }
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Spans of the tokens in `source[start..end]`.
pub(crate) fn tokens(source: &str, start: u32, end: u32) -> Vec<Span> {
    Scanner::new(source, start, end).filter(|(piece, _)| *piece == Piece::Token).map(|(_, span)| span).collect()
}

/// Spans of every comment in `source[start..end]`, in source order.
///
/// `start..end` is expected to be trivia (the leading trivia of a leaf).
pub fn comment_ranges(source: &str, start: u32, end: u32) -> Vec<Span> {
    Scanner::new(source, start, end).filter(|(piece, _)| *piece == Piece::Comment).map(|(_, span)| span).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'s>(source: &'s str, spans: &[Span]) -> Vec<&'s str> {
        spans.iter().map(|s| &source[s.start as usize..s.end as usize]).collect()
    }

    #[test]
    fn test_tokens_split_on_whitespace_and_comments() {
        let src = "export declare /* c */ class{";
        let spans = tokens(src, 0, src.len() as u32);
        assert_eq!(texts(src, &spans), vec!["export", "declare", "class{"]);
    }

    #[test]
    fn test_tokens_keep_strings_whole() {
        let src = r#" from "./a // b" ;"#;
        let spans = tokens(src, 0, src.len() as u32);
        assert_eq!(texts(src, &spans), vec!["from", r#""./a // b""#, ";"]);
    }

    #[test]
    fn test_tokens_handle_escaped_quotes() {
        let src = r#"'it\'s' x"#;
        let spans = tokens(src, 0, src.len() as u32);
        assert_eq!(texts(src, &spans), vec![r#"'it\'s'"#, "x"]);
    }

    #[test]
    fn test_comment_ranges() {
        let src = "\n/** doc */\n  // line\n  ";
        let spans = comment_ranges(src, 0, src.len() as u32);
        assert_eq!(texts(src, &spans), vec!["/** doc */", "// line"]);
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end() {
        let src = "a /* open";
        let spans = comment_ranges(src, 0, src.len() as u32);
        assert_eq!(texts(src, &spans), vec!["/* open"]);
    }

    #[test]
    fn test_scanner_respects_range() {
        let src = "aaa bbb ccc";
        let spans = tokens(src, 4, 7);
        assert_eq!(texts(src, &spans), vec!["bbb"]);
    }

    #[test]
    fn test_non_ascii_whitespace() {
        let src = "a\u{a0}b";
        let spans = tokens(src, 0, src.len() as u32);
        assert_eq!(texts(src, &spans), vec!["a", "b"]);
    }
}
