/// Post records and response shaping
///
/// These structs represent the data model that flows between the remote
/// API and the gallery. Records are immutable once received; the page
/// that fetched them owns them and the views borrow them for rendering.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Number of characters shown for a collapsed explanation.
const PREVIEW_LENGTH: usize = 50;

/// One day's entry from the remote daily-image API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    /// Date key in YYYY-MM-DD format, unique per day
    pub date: String,
    pub title: String,
    pub explanation: String,
    /// Attribution; the API omits it for public-domain material
    #[serde(default)]
    pub copyright: Option<String>,
    /// Display-resolution image URL
    #[serde(default)]
    pub url: Option<String>,
    /// High-resolution image URL, not present on every record
    #[serde(default)]
    pub hdurl: Option<String>,
    /// "image", "video" or whatever the API adds next; only images are kept
    pub media_type: String,
    /// API schema version tag
    #[serde(default)]
    pub service_version: Option<String>,
}

impl Post {
    /// Attribution line, with a fallback for records without one.
    pub fn attribution(&self) -> &str {
        self.copyright
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
            .unwrap_or("Unknown owner")
    }

    /// Short preview of the explanation for the collapsed card.
    /// Cuts on a character boundary, never mid-codepoint.
    pub fn preview(&self) -> String {
        self.explanation.chars().take(PREVIEW_LENGTH).collect()
    }

    /// The sharpest link available for sharing.
    pub fn share_link(&self) -> Option<&str> {
        self.hdurl.as_deref().or(self.url.as_deref())
    }
}

/// Keep only image records and flip the API's oldest-first order so the
/// newest post comes first.
pub fn image_posts(posts: Vec<Post>) -> Vec<Post> {
    let mut kept: Vec<Post> = posts
        .into_iter()
        .filter(|post| post.media_type == "image")
        .collect();
    kept.reverse();
    kept
}

/// Keep only posts whose date is liked in the mapping, newest first.
///
/// A day with a liked post next to unrelated non-liked material keeps
/// exactly the liked one; the mapping is the only filter here.
pub fn liked_posts(posts: Vec<Post>, likes: &BTreeMap<String, bool>) -> Vec<Post> {
    let mut kept: Vec<Post> = posts
        .into_iter()
        .filter(|post| likes.get(&post.date).copied().unwrap_or(false))
        .collect();
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(date: &str, media_type: &str) -> Post {
        Post {
            date: date.to_string(),
            title: format!("Post for {}", date),
            explanation: String::from("A field of distant galaxies."),
            copyright: None,
            url: Some(format!("https://images.example/{}.jpg", date)),
            hdurl: Some(format!("https://images.example/{}_hd.jpg", date)),
            media_type: media_type.to_string(),
            service_version: Some(String::from("v1")),
        }
    }

    fn dates(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|post| post.date.as_str()).collect()
    }

    #[test]
    fn test_image_posts_filters_and_reverses() {
        let batch = vec![
            post("2024-03-01", "image"),
            post("2024-03-02", "video"),
            post("2024-03-03", "image"),
            post("2024-03-04", "image"),
        ];

        let shaped = image_posts(batch);

        assert_eq!(dates(&shaped), vec!["2024-03-04", "2024-03-03", "2024-03-01"]);
    }

    #[test]
    fn test_image_posts_is_the_exact_reverse_of_an_all_image_batch() {
        let batch = vec![
            post("2024-03-01", "image"),
            post("2024-03-02", "image"),
            post("2024-03-03", "image"),
        ];

        let shaped = image_posts(batch);

        assert_eq!(dates(&shaped), vec!["2024-03-03", "2024-03-02", "2024-03-01"]);
    }

    #[test]
    fn test_liked_posts_keeps_only_liked_dates() {
        let batch = vec![
            post("2024-01-05", "image"),
            post("2024-01-10", "video"),
            post("2024-01-20", "image"),
        ];
        let mut likes = BTreeMap::new();
        likes.insert(String::from("2024-01-05"), true);
        likes.insert(String::from("2024-01-10"), true);
        likes.insert(String::from("2024-01-20"), false);

        let shaped = liked_posts(batch, &likes);

        // Liked dates survive regardless of media type; unliked and
        // unknown dates are dropped
        assert_eq!(dates(&shaped), vec!["2024-01-10", "2024-01-05"]);
    }

    #[test]
    fn test_attribution_falls_back_to_unknown_owner() {
        let mut anonymous = post("2024-03-02", "image");
        assert_eq!(anonymous.attribution(), "Unknown owner");

        anonymous.copyright = Some(String::from("   "));
        assert_eq!(anonymous.attribution(), "Unknown owner");

        anonymous.copyright = Some(String::from("J. Doe"));
        assert_eq!(anonymous.attribution(), "J. Doe");
    }

    #[test]
    fn test_preview_respects_character_boundaries() {
        let mut entry = post("2024-03-02", "image");
        entry.explanation = "Åland's night sky: aurora über alles! ".repeat(4);

        let preview = entry.preview();

        assert_eq!(preview.chars().count(), 50);
        assert!(entry.explanation.starts_with(&preview));
    }

    #[test]
    fn test_share_link_prefers_the_high_resolution_url() {
        let mut entry = post("2024-03-02", "image");
        assert_eq!(
            entry.share_link(),
            Some("https://images.example/2024-03-02_hd.jpg")
        );

        entry.hdurl = None;
        assert_eq!(
            entry.share_link(),
            Some("https://images.example/2024-03-02.jpg")
        );

        entry.url = None;
        assert_eq!(entry.share_link(), None);
    }

    #[test]
    fn test_posts_deserialize_with_unknown_fields() {
        let raw = r#"{
            "date": "2024-03-02",
            "title": "A Galaxy",
            "explanation": "Far away.",
            "media_type": "image",
            "url": "https://images.example/galaxy.jpg",
            "service_version": "v1",
            "resource": {"planet": "earth"}
        }"#;

        let entry: Post = serde_json::from_str(raw).unwrap();

        assert_eq!(entry.date, "2024-03-02");
        assert_eq!(entry.copyright, None);
        assert_eq!(entry.hdurl, None);
        assert_eq!(entry.media_type, "image");
    }
}
