//! The classical US Census Soundex algorithm, reimplemented directly rather
//! than pulled from a crate (per the design notes: phonetic-hash crates'
//! outputs can drift between implementations, and this pipeline's
//! cross-dataset identity keys depend on it being stable).

fn code(c: char) -> Option<u8> {
    match c {
        'B' | 'F' | 'P' | 'V' => Some(1),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some(2),
        'D' | 'T' => Some(3),
        'L' => Some(4),
        'M' | 'N' => Some(5),
        'R' => Some(6),
        _ => None,
    }
}

/// Compute the four-character Soundex code for `name`. Non-alphabetic
/// characters are ignored entirely. An empty or all-non-alphabetic input
/// yields an empty string.
pub fn soundex(name: &str) -> String {
    let letters: Vec<char> = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let Some(&first) = letters.first() else {
        return String::new();
    };

    let mut out = String::with_capacity(4);
    out.push(first);
    let mut last_code = code(first);

    for &c in &letters[1..] {
        if out.len() == 4 {
            break;
        }
        // H/W are fully transparent: they neither emit a digit nor reset
        // the adjacent-duplicate tracking, so e.g. "Ashcraft"'s S-H-C
        // collapses to a single '2'.
        if c == 'H' || c == 'W' {
            continue;
        }
        match code(c) {
            Some(digit) => {
                if last_code != Some(digit) {
                    out.push((b'0' + digit) as char);
                }
                last_code = Some(digit);
            }
            // A vowel-family letter (A/E/I/O/U/Y) acts as a separator:
            // it resets adjacency so a repeated consonant after it codes
            // again instead of collapsing.
            None => last_code = None,
        }
    }

    while out.len() < 4 {
        out.push('0');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classical_vectors() {
        assert_eq!(soundex("Robert"), "R163");
        assert_eq!(soundex("Rupert"), "R163");
        assert_eq!(soundex("Ashcraft"), "A261");
        assert_eq!(soundex("Tymczak"), "T522");
        assert_eq!(soundex("Pfister"), "P236");
    }

    #[test]
    fn same_code_for_common_spelling_variants() {
        assert_eq!(soundex("Jon"), soundex("John"));
        assert_eq!(soundex("Smith"), soundex("Smyth"));
    }

    #[test]
    fn pads_short_names() {
        assert_eq!(soundex("Lee"), "L000");
    }

    #[test]
    fn empty_name_yields_empty_code() {
        assert_eq!(soundex(""), "");
        assert_eq!(soundex("123"), "");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(soundex("smith"), soundex("SMITH"));
    }
}
