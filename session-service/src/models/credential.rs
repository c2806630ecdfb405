/// Scheme literal for access and refresh tokens.
pub const BEARER_SCHEME: &str = "Bearer";

/// Scheme literal for the billing webhook key.
pub const API_KEY_SCHEME: &str = "ApiKey";

/// A credential lifted out of an `Authorization` header. Request-scoped.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
}

impl Credential {
    pub fn scheme(&self) -> &'static str {
        match self {
            Credential::Bearer(_) => BEARER_SCHEME,
            Credential::ApiKey(_) => API_KEY_SCHEME,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Credential::Bearer(v) | Credential::ApiKey(v) => v,
        }
    }
}

// Values are secrets; only the scheme is printable.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential::{}(***)", self.scheme())
    }
}
