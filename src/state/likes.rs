/// The like store
///
/// One mapping from date-key to liked flag, loaded once at startup and
/// written through synchronously on every toggle. Unliking records
/// `false` instead of removing the entry, so "never liked" and "unliked"
/// stay distinguishable; a missing key always means "not liked".

use std::collections::BTreeMap;

use crate::date::{parse_date, Window};

use super::store::{get_json, set_json, Persist, LIKES_KEY};

#[derive(Debug, Default)]
pub struct LikeStore {
    likes: BTreeMap<String, bool>,
}

impl LikeStore {
    /// Load the persisted mapping. Missing or corrupt data starts empty.
    pub fn load(store: &dyn Persist) -> Self {
        let likes = match get_json(store, LIKES_KEY) {
            Ok(Some(likes)) => likes,
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                eprintln!("⚠️  Could not read likes, starting empty: {}", err);
                BTreeMap::new()
            }
        };

        LikeStore { likes }
    }

    pub fn is_liked(&self, date: &str) -> bool {
        self.likes.get(date).copied().unwrap_or(false)
    }

    /// Record a like or unlike and write the mapping through immediately.
    pub fn set(&mut self, store: &dyn Persist, date: &str, liked: bool) {
        self.likes.insert(date.to_string(), liked);
        if let Err(err) = set_json(store, LIKES_KEY, &self.likes) {
            eprintln!("⚠️  Could not persist like for {}: {}", date, err);
        }
    }

    /// Whether any date is currently liked.
    pub fn has_likes(&self) -> bool {
        self.likes.values().any(|&liked| liked)
    }

    /// The minimal window covering every liked date, or `None` when
    /// nothing is liked. One fetch of this window reaches every liked
    /// post without requesting each day individually.
    pub fn covering_window(&self) -> Option<Window> {
        // BTreeMap iterates keys in ascending order, which for the
        // YYYY-MM-DD key format is chronological
        let mut liked = self
            .likes
            .iter()
            .filter(|(_, &liked)| liked)
            .filter_map(|(date, _)| parse_date(date));

        let first = liked.next()?;
        let last = liked.last().unwrap_or(first);

        Some(Window {
            start: first,
            end: last,
        })
    }

    /// Read-only view of the whole mapping for response filtering.
    pub fn snapshot(&self) -> &BTreeMap<String, bool> {
        &self.likes
    }

    /// How many dates are currently liked.
    pub fn liked_count(&self) -> usize {
        self.likes.values().filter(|&&liked| liked).count()
    }
}
