//! Fixed character-to-character translation applied once per textual cell on read.
//!
//! Strips control characters and the reserved output delimiter, and
//! transliterates the Latin-1 supplement into ASCII approximations so that
//! every downstream file can be written with a plain `|` dialect. The mapping
//! is fixed at compile time and idempotent: translating already-clean text is
//! a no-op past trimming.

/// Translate one source character, if it needs translation.
///
/// Returns `None` when the character should be dropped entirely (control
/// characters, the pipe delimiter, and most of the C1 block), `Some(repl)`
/// when it should be replaced by a (possibly multi-character) string, and
/// leaves everything else alone by returning `Some` of a one-character
/// string built from `c` itself at the call site.
fn translate(c: char) -> Option<&'static str> {
    match c {
        // C0 controls except horizontal tab.
        '\u{0000}'..='\u{0008}' | '\u{000A}'..='\u{001F}' => None,
        '|' => None,
        // C1 controls.
        '\u{0080}'..='\u{0091}' | '\u{0093}'..='\u{009F}' => None,
        '\u{0092}' => None,
        '\u{00A0}' => Some(" "),
        '\u{00A1}' => Some("!"),
        '\u{00A2}' => Some(" cents"),
        '\u{00A5}' => Some(" Yen"),
        '\u{00A6}' => None,
        '\u{00A7}' => Some("Sec. "),
        '\u{00A8}' => None,
        '\u{00A9}' => Some(" Copyright"),
        '\u{00AB}' => Some("<<"),
        '\u{00AD}' => Some("-"),
        '\u{00AE}' => Some(" Registered"),
        '\u{00AF}' => None,
        '\u{00B0}' => Some(" degrees"),
        '\u{00B1}' => Some("+/-"),
        '\u{00B4}' => None,
        '\u{00B5}' => Some(" micro"),
        '\u{00B6}' => None,
        '\u{00B7}' => Some("."),
        '\u{00B8}' => None,
        '\u{00BB}' => Some(">>"),
        '\u{00BC}' => Some(" 1/4 "),
        '\u{00BD}' => Some(" 1/2 "),
        '\u{00BE}' => Some(" 3/4 "),
        '\u{00BF}' => Some("?"),
        '\u{00C0}' | '\u{00C1}' | '\u{00C2}' | '\u{00C3}' | '\u{00C4}' | '\u{00C5}' => Some("A"),
        '\u{00C6}' => Some("AE"),
        '\u{00C7}' => Some("C"),
        '\u{00C8}' | '\u{00C9}' | '\u{00CA}' | '\u{00CB}' => Some("E"),
        '\u{00CC}' | '\u{00CD}' | '\u{00CE}' | '\u{00CF}' => Some("I"),
        '\u{00D0}' => None,
        '\u{00D1}' => Some("N"),
        '\u{00D2}' | '\u{00D3}' | '\u{00D4}' | '\u{00D5}' | '\u{00D6}' | '\u{00D8}' => Some("O"),
        '\u{00D7}' => Some("x"),
        '\u{00D9}' | '\u{00DA}' | '\u{00DB}' | '\u{00DC}' => Some("U"),
        '\u{00DD}' => Some("Y"),
        '\u{00DE}' => None,
        '\u{00DF}' => Some("s"),
        '\u{00E0}' | '\u{00E1}' | '\u{00E2}' | '\u{00E3}' | '\u{00E4}' | '\u{00E5}' => Some("a"),
        '\u{00E6}' => Some("ae"),
        '\u{00E7}' => Some("c"),
        '\u{00E8}' | '\u{00E9}' | '\u{00EA}' | '\u{00EB}' => Some("e"),
        '\u{00EC}' | '\u{00ED}' | '\u{00EE}' | '\u{00EF}' => Some("i"),
        '\u{00F0}' => None,
        '\u{00F1}' => Some("n"),
        '\u{00F2}' | '\u{00F3}' | '\u{00F4}' | '\u{00F5}' | '\u{00F6}' | '\u{00F8}' => Some("o"),
        '\u{00F7}' => Some("/"),
        '\u{00F9}' | '\u{00FA}' | '\u{00FB}' | '\u{00FC}' => Some("u"),
        '\u{00FD}' => Some("y"),
        '\u{00FE}' => None,
        '\u{00FF}' => Some("y"),
        _ => Some(""), // sentinel meaning "pass through unchanged"; handled by caller
    }
}

/// Sanitize one raw cell: strip disallowed characters, transliterate the
/// Latin-1 supplement, and trim surrounding whitespace.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match translate(c) {
            None => continue,
            Some("") => out.push(c),
            Some(repl) => out.push_str(repl),
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_tab_drops_other_controls() {
        let sanitized = sanitize("a\tb\u{0007}c");
        assert!(sanitized.contains('\t'));
        assert!(!sanitized.contains('\u{0007}'));
    }

    #[test]
    fn strips_pipe_delimiter() {
        assert_eq!(sanitize("a|b"), "ab");
    }

    #[test]
    fn transliterates_accented_letters() {
        assert_eq!(sanitize("Sm\u{00e9}Smith"), "SmeSmith");
        assert_eq!(sanitize("Espa\u{00f1}a"), "Espana");
        assert_eq!(sanitize("stra\u{00df}e"), "strase");
        assert_eq!(sanitize("\u{00e6}ther"), "aether");
    }

    #[test]
    fn replaces_symbols() {
        assert_eq!(sanitize("\u{00ab}quote\u{00bb}"), "<<quote>>");
        assert_eq!(sanitize("50\u{00b0}"), "50 degrees");
        assert_eq!(sanitize("1\u{00bd}"), "1 1/2");
        assert_eq!(sanitize("5\u{00b7}2"), "5.2");
        assert_eq!(sanitize("3\u{00f7}2"), "3/2");
        assert_eq!(sanitize("2\u{00d7}2"), "2x2");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize("  hello  "), "hello");
    }

    #[test]
    fn idempotent() {
        let once = sanitize("Caf\u{00e9} \u{00ab}\u{00b0}\u{00bd}\u{00bb}|x");
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }
}
