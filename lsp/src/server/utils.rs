use std::hash::{Hash, Hasher};

use tower_lsp::lsp_types::Url;
use twox_hash::XxHash64;

pub(crate) fn compute_content_hash(content: &str) -> u64 {
    let mut hasher = XxHash64::default();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Cache key for an editor URI: the file path for `file:` URIs, the URI text otherwise.
pub(crate) fn uri_to_key(uri: &Url) -> String {
    match uri.to_file_path() {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(()) => uri.to_string(),
    }
}

pub(crate) fn key_to_uri(key: &str) -> Option<Url> {
    Url::from_file_path(key).ok().or_else(|| Url::parse(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_uris_map_to_paths_and_back() {
        let uri = Url::parse("file:///work/styles/main.sass").unwrap();
        let key = uri_to_key(&uri);
        assert_eq!(key, "/work/styles/main.sass");
        assert_eq!(key_to_uri(&key), Some(uri));
    }

    #[test]
    fn other_schemes_keep_their_text() {
        let uri = Url::parse("untitled:Untitled-1").unwrap();
        assert_eq!(uri_to_key(&uri), "untitled:Untitled-1");
        assert_eq!(key_to_uri("untitled:Untitled-1"), Some(uri));
    }

    #[test]
    fn hash_tracks_content() {
        assert_eq!(compute_content_hash(".a"), compute_content_hash(".a"));
        assert_ne!(compute_content_hash(".a"), compute_content_hash(".b"));
    }
}
