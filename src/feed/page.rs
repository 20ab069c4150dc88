/// Page state machines
///
/// The fetch lifecycle of every page lives here as plain data with pure
/// transitions, so the at-most-one-in-flight invariant and the
/// append-vs-replace distinction are testable without a live network.

use chrono::NaiveDate;

use crate::date::Window;

use super::api::FetchError;
use super::post::{image_posts, Post};

/// The recent-feed pagination machine.
///
/// The feed grows strictly backwards in time: every follow-up window
/// ends the day before the previous window started, so no date is
/// requested twice. `Loading` doubles as the in-flight guard: `extend`
/// refuses to hand out a new window unless the machine is settled in
/// `Loaded`, and the same state drives the loading indicator.
#[derive(Debug, Clone)]
pub enum Pager {
    /// Nothing fetched yet
    Idle,
    /// A request for `window` is in flight; `posts` stays on screen
    Loading { posts: Vec<Post>, window: Window },
    /// Settled; `window` is the oldest fetched boundary
    Loaded { posts: Vec<Post>, window: Window },
    /// A fetch failed; content is gone until the feed is restarted
    Failed(FetchError),
}

impl Pager {
    /// (Re)start the feed: drop whatever was loaded and request the
    /// month ending at `today`. Returns the window to fetch.
    pub fn begin(&mut self, today: NaiveDate) -> Window {
        let window = Window::ending_at(today);
        *self = Pager::Loading {
            posts: Vec::new(),
            window,
        };
        window
    }

    /// Scroll trigger. Returns the next window to fetch, or `None` while
    /// a request is already in flight (or the feed failed, or it was
    /// never started).
    pub fn extend(&mut self) -> Option<Window> {
        match self {
            Pager::Loaded { posts, window } => {
                let next = window.preceding();
                *self = Pager::Loading {
                    posts: std::mem::take(posts),
                    window: next,
                };
                Some(next)
            }
            _ => None,
        }
    }

    /// Apply a fetch resolution.
    ///
    /// New records are filtered to images, flipped to newest-first and
    /// appended after the existing content, so older pages extend the
    /// end of the feed and the global order stays descending. Failures
    /// clear the content. A resolution arriving while the machine is not
    /// loading is stale and ignored.
    pub fn resolve(&mut self, result: Result<Vec<Post>, FetchError>) {
        let Pager::Loading { posts, window } = self else {
            return;
        };

        match result {
            Ok(batch) => {
                let mut all = std::mem::take(posts);
                all.extend(image_posts(batch));
                let window = *window;
                *self = Pager::Loaded { posts: all, window };
            }
            Err(error) => *self = Pager::Failed(error),
        }
    }

    pub fn posts(&self) -> &[Post] {
        match self {
            Pager::Loading { posts, .. } | Pager::Loaded { posts, .. } => posts,
            Pager::Idle | Pager::Failed(_) => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Pager::Loading { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Pager::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Single-shot page content for the liked and custom-range pages.
///
/// Each resolution replaces the content wholesale; there is no
/// pagination and no appending here.
#[derive(Debug, Clone)]
pub enum Content {
    Loading,
    Ready(Vec<Post>),
    Failed(FetchError),
}

impl Default for Content {
    fn default() -> Self {
        Content::Ready(Vec::new())
    }
}

impl Content {
    /// Replace whatever was on screen with the resolved posts. The
    /// caller shapes the batch (image filter, like filter) beforehand.
    pub fn resolve(&mut self, result: Result<Vec<Post>, FetchError>) {
        *self = match result {
            Ok(posts) => Content::Ready(posts),
            Err(error) => Content::Failed(error),
        };
    }

    pub fn posts(&self) -> &[Post] {
        match self {
            Content::Ready(posts) => posts,
            Content::Loading | Content::Failed(_) => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Content::Loading)
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Content::Failed(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn post(date: &str, media_type: &str) -> Post {
        Post {
            date: date.to_string(),
            title: format!("Post for {}", date),
            explanation: String::from("A test explanation."),
            copyright: None,
            url: Some(format!("https://images.example/{}.jpg", date)),
            hdurl: None,
            media_type: media_type.to_string(),
            service_version: Some(String::from("v1")),
        }
    }

    fn dates(pager: &Pager) -> Vec<String> {
        pager.posts().iter().map(|post| post.date.clone()).collect()
    }

    #[test]
    fn test_begin_requests_one_month_back() {
        let mut pager = Pager::Idle;

        let window = pager.begin(date(2024, 6, 15));

        assert_eq!(window.start, date(2024, 5, 15));
        assert_eq!(window.end, date(2024, 6, 15));
        assert!(pager.is_loading());
        assert!(pager.posts().is_empty());
    }

    #[test]
    fn test_consecutive_pages_never_overlap() {
        let mut pager = Pager::Idle;
        let first = pager.begin(date(2024, 6, 15));
        pager.resolve(Ok(vec![post("2024-06-15", "image")]));

        let second = pager.extend().expect("a settled feed can extend");

        assert_eq!(second.end, date(2024, 5, 14));
        assert_eq!(second.start, date(2024, 4, 14));
        assert!(second.end < first.start);
    }

    #[test]
    fn test_extend_is_refused_while_a_request_is_in_flight() {
        let mut pager = Pager::Idle;
        assert!(pager.extend().is_none());

        pager.begin(date(2024, 6, 15));
        assert!(pager.extend().is_none());

        pager.resolve(Ok(vec![post("2024-06-15", "image")]));
        assert!(pager.extend().is_some());
        // Now loading again: a second scroll burst gets nothing
        assert!(pager.extend().is_none());
    }

    #[test]
    fn test_appended_pages_keep_descending_order_without_duplicates() {
        let mut pager = Pager::Idle;
        pager.begin(date(2024, 6, 15));
        pager.resolve(Ok(vec![
            post("2024-06-13", "image"),
            post("2024-06-14", "video"),
            post("2024-06-15", "image"),
        ]));

        pager.extend();
        pager.resolve(Ok(vec![
            post("2024-05-12", "image"),
            post("2024-05-13", "image"),
        ]));

        let listed = dates(&pager);
        assert_eq!(
            listed,
            vec!["2024-06-15", "2024-06-13", "2024-05-13", "2024-05-12"]
        );
        // Strictly descending date keys imply no duplicates
        assert!(listed.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn test_failure_clears_the_feed() {
        let mut pager = Pager::Idle;
        pager.begin(date(2024, 6, 15));
        pager.resolve(Ok(vec![post("2024-06-15", "image")]));
        pager.extend();

        pager.resolve(Err(FetchError::Api(String::from("rate limited"))));

        assert!(pager.posts().is_empty());
        assert!(!pager.is_loading());
        assert_eq!(
            pager.error(),
            Some(&FetchError::Api(String::from("rate limited")))
        );
    }

    #[test]
    fn test_resolutions_outside_loading_are_ignored() {
        let mut pager = Pager::Idle;
        pager.resolve(Ok(vec![post("2024-06-15", "image")]));
        assert!(matches!(pager, Pager::Idle));

        pager.begin(date(2024, 6, 15));
        pager.resolve(Ok(vec![post("2024-06-15", "image")]));
        let settled = dates(&pager);

        // A late duplicate resolution must not disturb the settled feed
        pager.resolve(Err(FetchError::Network(String::from("timed out"))));
        assert_eq!(dates(&pager), settled);
        assert!(pager.error().is_none());
    }

    #[test]
    fn test_content_replaces_instead_of_appending() {
        let mut content = Content::default();
        assert!(content.posts().is_empty());
        assert!(!content.is_loading());

        content = Content::Loading;
        content.resolve(Ok(vec![post("2024-03-01", "image")]));
        assert_eq!(content.posts().len(), 1);

        content = Content::Loading;
        content.resolve(Ok(vec![post("2024-04-01", "image")]));
        assert_eq!(content.posts().len(), 1);
        assert_eq!(content.posts()[0].date, "2024-04-01");
    }

    #[test]
    fn test_content_failure_clears_posts() {
        let mut content = Content::Loading;
        content.resolve(Ok(vec![post("2024-03-01", "image")]));

        content = Content::Loading;
        content.resolve(Err(FetchError::Api(String::from("rate limited"))));

        assert!(content.posts().is_empty());
        assert!(content.error().is_some());
    }
}
