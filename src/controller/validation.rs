use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("not an absolute URL: {0}")]
    Malformed(#[from] url::ParseError),
    #[error("URL has no host")]
    MissingHost,
}

/// Accept only absolute URLs with a scheme and a host
pub fn validate_url(input: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(input)?;
    if !url.has_host() || url.host_str().is_some_and(str::is_empty) {
        return Err(ValidationError::MissingHost);
    }
    Ok(url)
}
