/// Resolves the storage key behind a media reference.
///
/// Records written by this service always persist the key next to the URL.
/// Rows imported from the previous system may only carry the URL; for those
/// the key is re-derived from the URL path.
pub fn storage_key_for(url: Option<&str>, persisted_key: Option<&str>) -> Option<String> {
    if let Some(key) = persisted_key.map(str::trim).filter(|key| !key.is_empty()) {
        return Some(key.to_string());
    }

    url.and_then(key_from_url)
}

/// Folder + filename convention: the key is the last two path segments.
pub fn key_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map(|(_, p)| p).unwrap_or(""))
        .unwrap_or(path);

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => None,
        [only] => Some((*only).to_string()),
        [.., folder, file] => Some(format!("{folder}/{file}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_key_wins_over_url() {
        let key = storage_key_for(
            Some("https://bucket.s3.amazonaws.com/gallery/1-a.png"),
            Some("partner-institutions/details/1-a.png"),
        );
        assert_eq!(key.as_deref(), Some("partner-institutions/details/1-a.png"));
    }

    #[test]
    fn blank_persisted_key_falls_back_to_url() {
        let key = storage_key_for(
            Some("https://bucket.s3.amazonaws.com/gallery/1700-photo.png"),
            Some("  "),
        );
        assert_eq!(key.as_deref(), Some("gallery/1700-photo.png"));
    }

    #[test]
    fn url_derivation_uses_last_two_segments() {
        assert_eq!(
            key_from_url("https://cdn.example.org/a/b/leadership/17-me.jpg?v=2").as_deref(),
            Some("leadership/17-me.jpg")
        );
        assert_eq!(
            key_from_url("https://cdn.example.org/single.jpg").as_deref(),
            Some("single.jpg")
        );
        assert_eq!(key_from_url("https://cdn.example.org/"), None);
    }

    #[test]
    fn nothing_to_resolve() {
        assert_eq!(storage_key_for(None, None), None);
    }
}
