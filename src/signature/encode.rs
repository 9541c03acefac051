use std::{borrow::Cow, string::FromUtf8Error};

/// Percent-encodes a string as required by RFC 5849 §3.6.
///
/// Every byte of the UTF-8 encoding is escaped as `%XX` with uppercase hex,
/// except the RFC 3986 unreserved characters `ALPHA / DIGIT / "-" / "." /
/// "_" / "~"`. A space becomes `%20`, never `+`.
#[must_use]
pub fn percent_encode(input: &str) -> Cow<'_, str> {
    urlencoding::encode(input)
}

/// Reverses [`percent_encode`].
///
/// `+` is left untouched.
///
/// # Errors
///
/// Returns an error if the decoded bytes are not valid UTF-8.
pub fn percent_decode(input: &str) -> Result<Cow<'_, str>, FromUtf8Error> {
    urlencoding::decode(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreserved_characters_pass_through() {
        let unreserved = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
        assert_eq!(percent_encode(unreserved), unreserved);
    }

    #[test]
    fn reserved_characters_are_escaped_uppercase() {
        assert_eq!(
            percent_encode(":/?#[]@!$&'()*+,;="),
            "%3A%2F%3F%23%5B%5D%40%21%24%26%27%28%29%2A%2B%2C%3B%3D"
        );
        assert_eq!(percent_encode("a b%c"), "a%20b%25c");
        assert_eq!(percent_encode("\u{2713}"), "%E2%9C%93");
    }

    #[test]
    fn decode_reverses_encode_across_the_ascii_range() {
        let all_ascii: String = (0x20u8..0x7f).map(char::from).collect();
        let samples = [
            all_ascii.as_str(),
            "Hello Ladies + Gentlemen, a signed OAuth request!",
            "=%3D",
            "caf\u{e9} \u{1f600}",
            "",
        ];

        for sample in samples {
            let encoded = percent_encode(sample);
            assert!(
                encoded
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b"-._~%".contains(&b)),
                "unexpected character in {encoded}"
            );
            assert_eq!(percent_decode(&encoded).unwrap(), sample);
        }
    }

    #[test]
    fn decode_leaves_plus_alone() {
        assert_eq!(percent_decode("a+b%20c").unwrap(), "a+b c");
    }
}
