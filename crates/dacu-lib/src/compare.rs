//! Comparison of produced and expected solution output.

/// Returns whether the produced output is accepted for the expected output.
///
/// In strict mode both must be identical byte for byte. Otherwise trailing
/// whitespace is ignored on every line and trailing blank lines are ignored
/// at the end, but blank lines between content lines must still match.
///
/// ```
/// # use dacu_lib::compare::equivalent;
/// assert!(equivalent(b"1 2 \r\n3\n\n", b"1 2\n3", false));
/// assert!(!equivalent(b"1 2 \r\n3\n\n", b"1 2\n3", true));
/// assert!(!equivalent(b"1\n\n2\n", b"1\n2\n", false));
/// ```
pub fn equivalent(produced: &[u8], expected: &[u8], strict: bool) -> bool {
    if strict {
        return produced == expected;
    }

    lines(produced) == lines(expected)
}

/// Returns the right trimmed lines of a blob without its trailing blank lines.
///
/// Valid UTF-8 is trimmed of all Unicode whitespace, anything else only of
/// ASCII whitespace.
fn lines(blob: &[u8]) -> Vec<&[u8]> {
    match std::str::from_utf8(blob) {
        Ok(text) => text
            .trim_end_matches(is_space)
            .split('\n')
            .map(|line| line.trim_end_matches(is_space).as_bytes())
            .collect(),
        Err(_) => trim_bytes_end(blob)
            .split(|&b| b == b'\n')
            .map(trim_bytes_end)
            .collect(),
    }
}

/// Whether a char is trailing whitespace, this includes the byte order mark.
fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn trim_bytes_end(bytes: &[u8]) -> &[u8] {
    let len = bytes
        .iter()
        .rposition(|&b| !(b.is_ascii_whitespace() || b == b'\x0b'))
        .map_or(0, |last| last + 1);

    &bytes[..len]
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOBS: &[&[u8]] = &[
        b"",
        b"\n",
        b"a",
        b"a\n",
        b"a \nb\n",
        b"a\nb\n\n\n",
        b"a\n\nb",
        b"a\r\nb\r\n",
        b"a\x0b\n",
        "a\u{a0}\n".as_bytes(),
        b"a\xff \n",
    ];

    #[test]
    fn test_lenient_reflexive() {
        for blob in BLOBS {
            assert!(equivalent(blob, blob, false));
        }
    }

    #[test]
    fn test_lenient_symmetric() {
        for a in BLOBS {
            for b in BLOBS {
                assert_eq!(equivalent(a, b, false), equivalent(b, a, false));
            }
        }
    }

    #[test]
    fn test_lenient_trailing_whitespace() {
        assert!(equivalent(b"a \nb\n", b"a\nb\n", false));
        assert!(equivalent(b"a\t\r\nb", b"a\nb\n", false));
    }

    #[test]
    fn test_lenient_unicode_whitespace() {
        assert!(equivalent(b"1\x0b\n", b"1\n", false));
        assert!(equivalent("1\u{a0}\n".as_bytes(), b"1\n", false));
        assert!(equivalent("1\u{3000}\n".as_bytes(), b"1\n", false));
        assert!(equivalent("1\u{feff}\n2".as_bytes(), b"1\n2\n", false));
        assert!(!equivalent("1\u{a0}\n".as_bytes(), b"1\n", true));
    }

    #[test]
    fn test_lenient_invalid_utf8() {
        assert!(equivalent(b"\xff \x0b\r\n", b"\xff\n\n", false));
        assert!(!equivalent(b"\xff\n", b"\xfe\n", false));
    }

    #[test]
    fn test_lenient_trailing_blank_lines() {
        assert!(equivalent(b"a\nb\n", b"a\nb\n\n\n", false));
        assert!(equivalent(b"", b"\n \n", false));
    }

    #[test]
    fn test_lenient_internal_blank_lines() {
        assert!(!equivalent(b"a\n\nb\n", b"a\nb\n", false));
        assert!(equivalent(b"a\n  \nb\n", b"a\n\nb\n", false));
    }

    #[test]
    fn test_lenient_leading_whitespace() {
        assert!(!equivalent(b" a\n", b"a\n", false));
    }

    #[test]
    fn test_content_difference() {
        assert!(!equivalent(b"a\nb\n", b"a\nc\n", false));
        assert!(!equivalent(b"a\nb\n", b"a\nc\n", true));
    }

    #[test]
    fn test_strict() {
        assert!(equivalent(b"a\nb\n", b"a\nb\n", true));
        assert!(!equivalent(b"a\nb\n", b"a\nb", true));
        assert!(!equivalent(b"a \nb\n", b"a\nb\n", true));
    }
}
