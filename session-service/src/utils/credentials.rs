//! Pulling credentials out of the `Authorization` header.
//!
//! The header value is split on single spaces; the first segment must be the scheme
//! and the second is returned verbatim. Anything after the second segment is ignored.

use http::{header, HeaderMap};

use crate::models::credential::{Credential, API_KEY_SCHEME, BEARER_SCHEME};
use crate::services::ServiceError;

/// `Authorization: Bearer <token>`
///
/// An empty token (`"Bearer "` or `"Bearer  tok"`) is `CredentialMalformed`
/// rather than an empty string.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, ServiceError> {
    extract_scheme(headers, BEARER_SCHEME)
}

/// `Authorization: ApiKey <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, ServiceError> {
    extract_scheme(headers, API_KEY_SCHEME)
}

/// Either scheme, tagged by which one was presented.
pub fn extract_credential(headers: &HeaderMap) -> Result<Credential, ServiceError> {
    let (scheme, value) = split_authorization(headers)?;
    match scheme {
        BEARER_SCHEME => Ok(Credential::Bearer(value.to_string())),
        API_KEY_SCHEME => Ok(Credential::ApiKey(value.to_string())),
        _ => Err(ServiceError::CredentialMalformed),
    }
}

fn extract_scheme(headers: &HeaderMap, scheme: &str) -> Result<String, ServiceError> {
    let credential = extract_credential(headers)?;
    if credential.scheme() != scheme {
        return Err(ServiceError::CredentialMalformed);
    }
    Ok(credential.into_value())
}

fn split_authorization(headers: &HeaderMap) -> Result<(&str, &str), ServiceError> {
    let raw = match headers.get(header::AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(ServiceError::CredentialMissing),
    };
    let raw = raw.to_str().map_err(|_| ServiceError::CredentialMalformed)?;

    let mut segments = raw.split(' ');
    match (segments.next(), segments.next()) {
        (Some(scheme), Some(value)) if !value.is_empty() => Ok((scheme, value)),
        _ => Err(ServiceError::CredentialMalformed),
    }
}
