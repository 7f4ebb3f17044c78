use crate::span::Span;

/// Commas separate operands and are otherwise as insignificant as whitespace.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | ',')
}

/// One whitespace-delimited token of a source line.
///
/// Parentheses are kept inside the token so the encoder can tell a memory
/// indirect operand like `0x1F(R2)` from a bare literal or register.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Span,
}

/// A source line split into its structural parts.
#[derive(Default, Debug)]
pub struct Line<'a> {
    pub label: Option<Token<'a>>,
    pub mnemonic: Option<Token<'a>>,
    pub operands: Vec<Token<'a>>,
}

/// Split one raw source line. `base` is the line's byte offset into the full
/// source, so token spans index the whole file.
///
/// A line is a label line only if its first token carries a colon with
/// non-empty text before it; text after the colon continues as the mnemonic.
/// Operand punctuation is never rejected here, it surfaces at encode time.
pub fn line<'a>(src_line: &'a str, base: usize) -> Line<'a> {
    let mut toks = tokenize(src_line, base);
    let mut out = Line::default();

    if let Some(first) = toks.first().copied() {
        if let Some(pos) = first.text.find(':') {
            if pos > 0 {
                out.label = Some(Token {
                    text: &first.text[..pos],
                    span: Span::new(first.span.offs(), pos),
                });
                let rest = &first.text[pos + 1..];
                if rest.is_empty() {
                    toks.remove(0);
                } else {
                    // Mnemonic glued to the label, as in `LOOP:ADD`
                    toks[0] = Token {
                        text: rest,
                        span: Span::new(first.span.offs() + pos + 1, rest.len()),
                    };
                }
            }
        }
    }

    let mut toks = toks.into_iter();
    out.mnemonic = toks.next();
    out.operands = toks.collect();
    out
}

fn tokenize<'a>(s: &'a str, base: usize) -> Vec<Token<'a>> {
    let mut toks = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in s.char_indices() {
        if is_separator(c) || c == '\n' {
            if let Some(st) = start.take() {
                toks.push(Token {
                    text: &s[st..i],
                    span: Span::new(base + st, i - st),
                });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(st) = start {
        toks.push(Token {
            text: &s[st..],
            span: Span::new(base + st, s.len() - st),
        });
    }
    toks
}

#[cfg(test)]
mod test {
    use super::*;

    fn texts<'a>(line: &'a Line) -> Vec<&'a str> {
        line.operands.iter().map(|t| t.text).collect()
    }

    #[test]
    fn plain_instruction() {
        let l = line("ADD R1, R2, R3", 0);
        assert!(l.label.is_none());
        assert_eq!(l.mnemonic.unwrap().text, "ADD");
        assert_eq!(texts(&l), vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn labeled_instruction() {
        let l = line("LOOP: ADD R1, R2, R3", 0);
        assert_eq!(l.label.unwrap().text, "LOOP");
        assert_eq!(l.mnemonic.unwrap().text, "ADD");
        assert_eq!(texts(&l), vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn glued_label() {
        let l = line("LOOP:ADD R1, R2, R3", 0);
        assert_eq!(l.label.unwrap().text, "LOOP");
        assert_eq!(l.mnemonic.unwrap().text, "ADD");
    }

    #[test]
    fn bare_label() {
        let l = line("END:", 0);
        assert_eq!(l.label.unwrap().text, "END");
        assert!(l.mnemonic.is_none());
        assert!(l.operands.is_empty());
    }

    #[test]
    fn leading_colon_is_not_a_label() {
        let l = line(":WAT R1", 0);
        assert!(l.label.is_none());
        assert_eq!(l.mnemonic.unwrap().text, ":WAT");
    }

    #[test]
    fn empty_line() {
        let l = line("   \t ", 0);
        assert!(l.label.is_none());
        assert!(l.mnemonic.is_none());
    }

    #[test]
    fn parens_stay_in_token() {
        let l = line("LD R1, 0x1FF(R2)", 0);
        assert_eq!(texts(&l), vec!["R1", "0x1FF(R2)"]);
    }

    #[test]
    fn spans_index_full_source() {
        let l = line("BNEZ R1, LOOP", 100);
        let op = l.operands[1];
        assert_eq!(op.text, "LOOP");
        assert_eq!(op.span.offs(), 109);
        assert_eq!(op.span.len(), 4);
    }
}
