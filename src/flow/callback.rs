use std::collections::HashMap;

use http::Uri;

/// The query parameters the provider appended to the redirect URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams(HashMap<String, String>);

impl CallbackParams {
    /// Decodes a query string such as `oauth_token=...&oauth_verifier=...`.
    ///
    /// When a name repeats, the last value wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect()
    }

    /// Decodes the query string of the URI the user was redirected to.
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        uri.query().map(Self::from_query).unwrap_or_default()
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for CallbackParams {
    fn from(value: HashMap<String, String>) -> Self {
        Self(value)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CallbackParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
