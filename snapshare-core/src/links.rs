//! Shareable links for an event, and reading an event id back out of one.

use crate::error::{SnapError, SnapResult};

/// Path segments an event id can follow in a shared link.
const LINK_KINDS: [&str; 3] = ["upload", "gallery", "event"];

/// Builds the upload and gallery links handed out to participants.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        LinkBuilder { base_url }
    }

    pub fn upload_link(&self, event_id: &str) -> String {
        format!("{}/upload/{}", self.base_url, event_id)
    }

    pub fn gallery_link(&self, event_id: &str) -> String {
        format!("{}/gallery/{}", self.base_url, event_id)
    }
}

impl Default for LinkBuilder {
    fn default() -> Self {
        LinkBuilder::new(crate::constants::DEFAULT_BASE_URL)
    }
}

/// The event id in a pasted link: the segment after the first `/upload/`,
/// `/gallery/` or `/event/`. Any origin is accepted. A query string or
/// fragment after the id is dropped.
pub fn event_id_from_link(link: &str) -> Option<&str> {
    let path = link.trim().split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').collect();

    segments.windows(2).skip(1).find_map(|pair| {
        (LINK_KINDS.contains(&pair[0]) && !pair[1].is_empty()).then_some(pair[1])
    })
}

/// Accept either a bare event id or a shared link to the event.
pub fn parse_event_ref(input: &str) -> SnapResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SnapError::InvalidInput("event id must not be empty".into()));
    }
    if !input.contains('/') {
        return Ok(input.to_string());
    }

    event_id_from_link(input)
        .map(str::to_string)
        .ok_or_else(|| SnapError::InvalidInput(format!("'{input}' is not an upload or gallery link")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_and_id() {
        let links = LinkBuilder::new("https://photos.example.org");
        assert_eq!(links.upload_link("x1"), "https://photos.example.org/upload/x1");
        assert_eq!(links.gallery_link("x1"), "https://photos.example.org/gallery/x1");
    }

    #[test]
    fn trailing_slashes_are_dropped() {
        let links = LinkBuilder::new("https://photos.example.org//");
        assert_eq!(links.upload_link("x1"), "https://photos.example.org/upload/x1");
        assert_eq!(links.gallery_link("x1"), "https://photos.example.org/gallery/x1");
    }

    #[test]
    fn extracts_id_from_any_shared_link() {
        let links = LinkBuilder::new("https://photos.example.org");
        assert_eq!(event_id_from_link(&links.upload_link("x1")), Some("x1"));
        assert_eq!(event_id_from_link(&links.gallery_link("x1")), Some("x1"));
        assert_eq!(event_id_from_link("http://localhost:5173/event/abc"), Some("abc"));
        assert_eq!(event_id_from_link("/gallery/abc/extra"), Some("abc"));
        assert_eq!(event_id_from_link("  https://a.test/upload/abc?ref=qr#top "), Some("abc"));
    }

    #[test]
    fn rejects_links_without_an_event() {
        assert_eq!(event_id_from_link("https://a.test/"), None);
        assert_eq!(event_id_from_link("https://a.test/gallery/"), None);
        assert_eq!(event_id_from_link("https://a.test/photos/abc"), None);
        assert_eq!(event_id_from_link("gallery/abc"), None);
    }

    #[test]
    fn event_refs_take_ids_or_links() {
        assert_eq!(parse_event_ref("abc123").unwrap(), "abc123");
        assert_eq!(parse_event_ref(" abc123 ").unwrap(), "abc123");
        assert_eq!(parse_event_ref("https://a.test/gallery/abc123").unwrap(), "abc123");
        assert!(matches!(parse_event_ref("https://a.test/about"), Err(SnapError::InvalidInput(_))));
        assert!(matches!(parse_event_ref("   "), Err(SnapError::InvalidInput(_))));
    }
}
