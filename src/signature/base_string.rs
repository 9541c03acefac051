use http::Method;

use crate::{EndpointUrl, signature::percent_encode};

/// Normalizes request parameters (RFC 5849 §3.4.1.3.2).
///
/// Names and values are percent-encoded, sorted by encoded name and then by
/// encoded value, and joined as `name=value` pairs separated by `&`. The
/// result does not depend on the order of `parameters`.
#[must_use]
pub fn normalize_parameters<K: AsRef<str>, V: AsRef<str>>(parameters: &[(K, V)]) -> String {
    let mut encoded = parameters
        .iter()
        .map(|(name, value)| {
            (
                percent_encode(name.as_ref()).into_owned(),
                percent_encode(value.as_ref()).into_owned(),
            )
        })
        .collect::<Vec<_>>();
    encoded.sort_unstable();

    encoded
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the signature base string (RFC 5849 §3.4.1).
///
/// `parameters` are the request parameters other than those carried in the
/// URL's query string; the query is read from `url` and merged in. They must
/// not contain `oauth_signature`.
#[must_use]
pub fn base_string<K: AsRef<str>, V: AsRef<str>>(
    method: &Method,
    url: &EndpointUrl,
    parameters: &[(K, V)],
) -> String {
    let mut all_parameters = url.query_pairs();
    all_parameters.extend(
        parameters
            .iter()
            .map(|(name, value)| (name.as_ref().to_owned(), value.as_ref().to_owned())),
    );

    [
        method.as_str().to_ascii_uppercase(),
        percent_encode(&url.normalized()).into_owned(),
        percent_encode(&normalize_parameters(&all_parameters)).into_owned(),
    ]
    .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntoEndpointUrl as _;

    /// The worked example of RFC 5849 §3.4.1.
    #[test]
    fn rfc5849_section_3_4_1_example() {
        let url = "http://example.com/request?b5=%3D%253D&a3=a&c%40=&a2=r%20b"
            .into_endpoint_url()
            .unwrap();
        let parameters = [
            ("oauth_consumer_key", "9djdj82h48djs9d2"),
            ("oauth_token", "kkk9d7dh3k39sjv7"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "137131201"),
            ("oauth_nonce", "7d8f3e4a"),
            ("c2", ""),
            ("a3", "2 q"),
        ];

        assert_eq!(
            base_string(&Method::POST, &url, &parameters),
            "POST&http%3A%2F%2Fexample.com%2Frequest&a2%3Dr%2520b%26a3%3D2%2520q\
             %26a3%3Da%26b5%3D%253D%25253D%26c%2540%3D%26c2%3D%26oauth_consumer_key\
             %3D9djdj82h48djs9d2%26oauth_nonce%3D7d8f3e4a%26oauth_signature_method\
             %3DHMAC-SHA1%26oauth_timestamp%3D137131201%26oauth_token%3Dkkk9d7dh3k39sjv7"
        );
    }

    #[test]
    fn normalization_ignores_input_order() {
        let forward = [("b", "2"), ("a", "1"), ("a", "0"), ("c d", "x y")];
        let mut reversed = forward;
        reversed.reverse();

        let expected = "a=0&a=1&b=2&c%20d=x%20y";
        assert_eq!(normalize_parameters(&forward), expected);
        assert_eq!(normalize_parameters(&reversed), expected);
    }

    #[test]
    fn sorting_uses_encoded_names() {
        // "@" encodes to "%40", which sorts before "a".
        let parameters = [("a", "1"), ("@", "2"), ("~", "3")];
        assert_eq!(normalize_parameters(&parameters), "%40=2&a=1&~=3");
    }

    #[test]
    fn lowercase_method_is_uppercased() {
        let url = "https://api.example.com/x".into_endpoint_url().unwrap();
        let method = Method::from_bytes(b"post").unwrap();
        let base = base_string::<&str, &str>(&method, &url, &[]);
        assert!(base.starts_with("POST&https%3A%2F%2Fapi.example.com%2Fx&"));
    }
}
