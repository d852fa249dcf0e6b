//! Grammar validation helpers for header framing.
//!
//! Based on RFC 2045 token definitions and RFC 5322 field syntax.

/// Reports whether the byte is in 'tspecials' as defined by RFC 1521 and RFC 2045.
///
/// tspecials := "(" / ")" / "<" / ">" / "@" / "," / ";" / ":" / "\" / <"> / "/" / "[" / "]" / "?" / "="
pub fn is_tspecial(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/' | b'[' | b']' | b'?' | b'='
    )
}

/// Reports whether the byte is in 'token' as defined by RFC 1521 and RFC 2045.
///
/// token := 1*<any (US-ASCII) CHAR except SPACE, CTLs, or tspecials>
pub fn is_token_char(b: u8) -> bool {
    b > 0x20 && b < 0x7f && !is_tspecial(b)
}

/// Reports whether the string is a valid 'token'.
///
/// Header names must satisfy this to be written.
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// Reports whether the byte is in 'bchars' as defined by RFC 2046.
///
/// bchars := bcharsnospace / " "
/// bcharsnospace := DIGIT / ALPHA / "'" / "(" / ")" / "+" / "_" / "," / "-" / "." / "/" / ":" / "=" / "?"
pub fn is_boundary_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?' | b' ')
}

/// Reports whether the byte would break line framing if written inside a header line.
pub fn is_line_breaking(b: u8) -> bool {
    matches!(b, b'\r' | b'\n' | 0)
}

/// Escapes quotes and backslashes for use inside a quoted-string.
pub fn escape_quotes(s: &str) -> String {
    if !s.contains(|c| matches!(c, '"' | '\\')) {
        return s.to_string();
    }
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_tspecial() {
        for b in b"()<>@,;:\\\"/[]?=" {
            assert!(is_tspecial(*b), "{} should be tspecial", *b as char);
        }

        assert!(!is_tspecial(b'a'));
        assert!(!is_tspecial(b'Z'));
        assert!(!is_tspecial(b'-'));
    }

    #[test]
    fn test_is_token() {
        assert!(is_token("Content-Disposition"));
        assert!(is_token("X-Custom_Header.1"));

        assert!(!is_token(""));
        assert!(!is_token("Content Type"));
        assert!(!is_token("Name:"));
        assert!(!is_token("Bad\r\nHeader"));
        assert!(!is_token("ünïcode"));
    }

    #[test]
    fn test_is_boundary_char() {
        for b in b"azAZ09'()+_,-./:=? " {
            assert!(is_boundary_char(*b), "{} should be a boundary char", *b as char);
        }

        for b in b";\"<>@[]\\\r\n\t\0" {
            assert!(!is_boundary_char(*b), "{:#04x} should not be a boundary char", *b);
        }
        assert!(!is_boundary_char(0xff));
        assert!(!is_boundary_char(0x01));
    }

    #[test]
    fn test_is_line_breaking() {
        assert!(is_line_breaking(b'\r'));
        assert!(is_line_breaking(b'\n'));
        assert!(is_line_breaking(0));
        assert!(!is_line_breaking(b'\t'));
        assert!(!is_line_breaking(b' '));
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape_quotes("hello"), "hello");
        assert_eq!(escape_quotes("hel\"lo"), "hel\\\"lo");
        assert_eq!(escape_quotes("hel\\lo"), "hel\\\\lo");
        assert_eq!(escape_quotes("hel\\\"lo"), "hel\\\\\\\"lo");
    }
}
