use std::collections::BTreeMap;

/// Name of the bearer-token header.
pub const AUTHORIZATION: &str = "Authorization";

/// Headers attached to authenticated requests.
///
/// Built from the current session token; empty when there is no session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders(BTreeMap<String, String>);

impl AuthHeaders {
    /// An empty header set.
    pub fn none() -> Self {
        Self::default()
    }

    /// `Authorization: Bearer <token>`.
    pub fn bearer(token: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
        Self(headers)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// The token carried by the `Authorization` header, if any.
    pub fn token(&self) -> Option<&str> {
        self.get(AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
