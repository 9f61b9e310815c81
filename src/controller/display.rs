use crate::client::normalize_short_id;

/// Text shown for a short URL.
///
/// Without a display domain the URL is shown as returned by the service.
/// With one, the identifier is shown under that domain instead. This never
/// changes the value used for links or the clipboard.
pub fn display_short_url(short_url: &str, display_domain: Option<&str>) -> String {
    let domain = display_domain
        .map(|d| d.trim().trim_end_matches('/'))
        .filter(|d| !d.is_empty());

    match (domain, normalize_short_id(short_url)) {
        (Some(domain), Some(id)) => format!("{domain}/{id}"),
        _ => short_url.to_string(),
    }
}
