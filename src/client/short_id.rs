use url::Url;

/// Reduce a pasted short URL or identifier to the bare identifier.
///
/// Scheme and host are dropped, as are query and fragment. The last
/// non-empty path segment is kept, percent-decoded and with any `{`/`}`
/// removed, so `https://svc/abc123/`, `https://svc/%7Babc123%7D`,
/// `{abc123}` and `abc123` all yield `abc123`.
pub fn normalize_short_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    if trimmed.contains("://") {
        let url = Url::parse(trimmed).ok()?;
        return last_segment(url.path_segments()?);
    }

    let path = trimmed.split(['?', '#']).next().unwrap_or_default();
    last_segment(path.split('/'))
}

fn last_segment<'a>(segments: impl DoubleEndedIterator<Item = &'a str>) -> Option<String> {
    segments
        .rev()
        .map(|segment| {
            let decoded = urlencoding::decode(segment)
                .map(|cow| cow.into_owned())
                .unwrap_or_else(|_| segment.to_string());
            decoded.replace(['{', '}'], "")
        })
        .find(|segment| !segment.is_empty())
}
