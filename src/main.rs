use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::Local;
use iced::widget::{
    button, column, container, horizontal_space, image, row, scrollable, text, text_input, toggler,
};
use iced::{Alignment, Element, Length, Task, Theme};

// Declare the application modules
mod date;
mod feed;
mod state;
mod ui;

use date::{format_date, parse_date, Window};
use feed::api::{fetch_window, ApiConfig, FetchError};
use feed::media;
use feed::page::{Content, Pager};
use feed::post::{image_posts, liked_posts, Post};
use state::likes::LikeStore;
use state::store::{get_json, set_json, SettingsStore, DARK_MODE_KEY};
use ui::gallery::gallery;

/// Distance from the bottom of the scrolled content (in pixels) at which
/// the recent feed starts fetching its next page.
const SCROLL_THRESHOLD: f32 = 200.0;

/// The three navigable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Recent,
    Liked,
    ByDate,
}

/// Main application state
struct Stargram {
    /// Durable settings database (likes, dark mode)
    store: SettingsStore,
    /// The like mapping, loaded once and written through on toggle
    likes: LikeStore,
    /// Remote API settings from the environment
    config: ApiConfig,
    /// Shared HTTP client
    client: reqwest::Client,
    /// Which page is on screen
    tab: Tab,
    /// Recent-feed pagination machine
    recent: Pager,
    /// Liked-feed content
    liked: Content,
    /// Custom-range content
    by_date: Content,
    /// Custom-range inputs (YYYY-MM-DD strings)
    start_input: String,
    end_input: String,
    /// Sequence numbers guarding each page against stale resolutions
    recent_seq: u64,
    liked_seq: u64,
    by_date_seq: u64,
    /// Cached preview handles keyed by date
    previews: HashMap<String, image::Handle>,
    /// Dates whose explanation is currently expanded
    expanded: HashSet<String>,
    /// Dark mode flag, persisted across sessions
    dark: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User picked a page from the navigation bar
    TabSelected(Tab),
    /// User flipped the dark-mode toggler
    DarkModeToggled(bool),
    /// The scrollable viewport moved (drives recent-feed pagination)
    Scrolled(scrollable::Viewport),
    /// A recent-feed fetch resolved
    RecentLoaded(u64, Result<Vec<Post>, FetchError>),
    /// The liked-feed fetch resolved
    LikedLoaded(u64, Result<Vec<Post>, FetchError>),
    /// A custom-range fetch resolved
    RangeLoaded(u64, Result<Vec<Post>, FetchError>),
    /// Custom-range inputs changed
    StartDateChanged(String),
    EndDateChanged(String),
    /// Like button on a post (date key, new value)
    LikeToggled(String, bool),
    /// Share button: copy a post link to the clipboard
    ShareRequested(String),
    /// Read more / read less on a post
    ExpandToggled(String, bool),
    /// A preview image finished downloading (or gave up)
    PreviewLoaded(String, Option<PathBuf>),
}

impl Stargram {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // Without an endpoint and key every fetch would fail, so refuse
        // to start instead of starting blind
        let config = ApiConfig::from_env()
            .expect("Missing API configuration. Set STARGRAM_API_URL and STARGRAM_API_KEY.");

        // If this fails, we panic because the app cannot function
        // without its settings database
        let store = SettingsStore::open_default()
            .expect("Failed to initialize settings database. Check permissions and disk space.");

        let likes = LikeStore::load(&store);
        let dark = get_json(&store, DARK_MODE_KEY).ok().flatten().unwrap_or(false);

        println!("🌌 Stargram initialized with {} liked posts", likes.liked_count());

        let today = Local::now().date_naive();
        let initial = Window::ending_at(today);

        let mut app = Stargram {
            store,
            likes,
            config,
            client: reqwest::Client::new(),
            tab: Tab::Recent,
            recent: Pager::Idle,
            liked: Content::default(),
            by_date: Content::default(),
            start_input: format_date(initial.start),
            end_input: format_date(initial.end),
            recent_seq: 0,
            liked_seq: 0,
            by_date_seq: 0,
            previews: HashMap::new(),
            expanded: HashSet::new(),
            dark,
            status: String::from("Loading the latest posts..."),
        };

        let window = app.recent.begin(today);
        let task = app.fetch_recent(window);

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                if tab == self.tab {
                    return Task::none();
                }
                self.open_tab(tab)
            }

            Message::DarkModeToggled(dark) => {
                self.dark = dark;
                if let Err(err) = set_json(&self.store, DARK_MODE_KEY, &dark) {
                    eprintln!("⚠️  Could not persist dark-mode preference: {}", err);
                }
                Task::none()
            }

            Message::Scrolled(viewport) => {
                if self.tab != Tab::Recent {
                    return Task::none();
                }

                let offset = viewport.absolute_offset();
                let bottom = offset.y + viewport.bounds().height;
                if bottom < viewport.content_bounds().height - SCROLL_THRESHOLD {
                    return Task::none();
                }

                // `extend` refuses while a request is in flight, so a
                // burst of scroll events issues at most one fetch
                match self.recent.extend() {
                    Some(window) => self.fetch_recent(window),
                    None => Task::none(),
                }
            }

            Message::RecentLoaded(seq, result) => {
                if seq != self.recent_seq {
                    return Task::none(); // resolved after the page was re-entered
                }
                self.recent.resolve(result);
                if let Some(error) = self.recent.error() {
                    self.status = format!("Couldn't load posts: {}", error);
                    return Task::none();
                }
                self.status = format!("Showing {} posts", self.recent.posts().len());
                let posts = self.recent.posts().to_vec();
                self.fetch_previews(&posts)
            }

            Message::LikedLoaded(seq, result) => {
                if seq != self.liked_seq {
                    return Task::none();
                }
                let shaped = result.map(|batch| liked_posts(batch, self.likes.snapshot()));
                self.liked.resolve(shaped);
                if let Some(error) = self.liked.error() {
                    self.status = format!("Couldn't load posts: {}", error);
                    return Task::none();
                }
                self.status = format!("Showing {} liked posts", self.liked.posts().len());
                let posts = self.liked.posts().to_vec();
                self.fetch_previews(&posts)
            }

            Message::RangeLoaded(seq, result) => {
                if seq != self.by_date_seq {
                    return Task::none();
                }
                self.by_date.resolve(result.map(image_posts));
                if let Some(error) = self.by_date.error() {
                    self.status = format!("Couldn't load posts: {}", error);
                    return Task::none();
                }
                self.status = format!("Showing {} posts in range", self.by_date.posts().len());
                let posts = self.by_date.posts().to_vec();
                self.fetch_previews(&posts)
            }

            Message::StartDateChanged(value) => {
                self.start_input = value;
                self.fetch_range()
            }

            Message::EndDateChanged(value) => {
                self.end_input = value;
                self.fetch_range()
            }

            Message::LikeToggled(date, liked) => {
                self.likes.set(&self.store, &date, liked);
                Task::none()
            }

            Message::ShareRequested(link) => {
                self.status = String::from("Copied link to clipboard!");
                iced::clipboard::write(link)
            }

            Message::ExpandToggled(date, expanded) => {
                if expanded {
                    self.expanded.insert(date);
                } else {
                    self.expanded.remove(&date);
                }
                Task::none()
            }

            Message::PreviewLoaded(date, path) => {
                if let Some(path) = path {
                    self.previews.insert(date, image::Handle::from_path(path));
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = container(
            row![
                text("Stargram").size(20),
                horizontal_space(),
                text(&self.status).size(12),
                horizontal_space(),
                text("☀").size(14),
                toggler(self.dark)
                    .on_toggle(Message::DarkModeToggled)
                    .width(Length::Shrink),
                text("🌙").size(14),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
        .width(Length::Fill)
        .padding([8.0, 16.0]);

        let page: Element<Message> = match self.tab {
            Tab::Recent => gallery(
                self.recent.posts(),
                self.recent.error(),
                self.recent.is_loading(),
                &self.likes,
                &self.expanded,
                &self.previews,
            ),
            Tab::Liked => gallery(
                self.liked.posts(),
                self.liked.error(),
                self.liked.is_loading(),
                &self.likes,
                &self.expanded,
                &self.previews,
            ),
            Tab::ByDate => column![
                self.range_inputs(),
                gallery(
                    self.by_date.posts(),
                    self.by_date.error(),
                    self.by_date.is_loading(),
                    &self.likes,
                    &self.expanded,
                    &self.previews,
                ),
            ]
            .spacing(16)
            .align_x(Alignment::Center)
            .into(),
        };

        let content = scrollable(container(page).width(Length::Fill).padding(16))
            .on_scroll(Message::Scrolled)
            .width(Length::Fill)
            .height(Length::Fill);

        let nav = container(
            row![
                self.nav_button("Home", Tab::Recent),
                self.nav_button("Liked", Tab::Liked),
                self.nav_button("By Date", Tab::ByDate),
            ]
            .spacing(24)
            .align_y(Alignment::Center),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(8);

        column![header, content, nav].into()
    }

    /// Map the persisted dark-mode flag onto the built-in themes
    fn theme(&self) -> Theme {
        if self.dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Re-enter a page: reset its state and kick off whatever fetch it
    /// needs, the same as a fresh mount of that page.
    fn open_tab(&mut self, tab: Tab) -> Task<Message> {
        self.tab = tab;
        self.expanded.clear();

        match tab {
            Tab::Recent => {
                let window = self.recent.begin(Local::now().date_naive());
                self.status = String::from("Loading the latest posts...");
                self.fetch_recent(window)
            }

            Tab::Liked => {
                self.liked_seq += 1;
                let seq = self.liked_seq;

                // Nothing liked yet: resolve to empty without touching
                // the network
                if !self.likes.has_likes() {
                    self.liked = Content::Ready(Vec::new());
                    return Task::none();
                }

                match self.likes.covering_window() {
                    Some(window) => {
                        self.liked = Content::Loading;
                        Task::perform(
                            fetch_window(self.client.clone(), self.config.clone(), window),
                            move |result| Message::LikedLoaded(seq, result),
                        )
                    }
                    // Liked keys that are not real dates cannot be
                    // fetched; show the empty page instead
                    None => {
                        self.liked = Content::Ready(Vec::new());
                        Task::none()
                    }
                }
            }

            Tab::ByDate => {
                let today = Local::now().date_naive();
                let initial = Window::ending_at(today);
                self.start_input = format_date(initial.start);
                self.end_input = format_date(initial.end);
                self.by_date = Content::default();
                self.fetch_range()
            }
        }
    }

    /// Issue the fetch for a recent-feed window.
    fn fetch_recent(&mut self, window: Window) -> Task<Message> {
        self.recent_seq += 1;
        let seq = self.recent_seq;
        Task::perform(
            fetch_window(self.client.clone(), self.config.clone(), window),
            move |result| Message::RecentLoaded(seq, result),
        )
    }

    /// Validate the range inputs and fetch when both parse. Invalid
    /// input quietly suppresses the fetch until it is corrected.
    fn fetch_range(&mut self) -> Task<Message> {
        let (Some(start), Some(end)) = (parse_date(&self.start_input), parse_date(&self.end_input))
        else {
            return Task::none();
        };

        self.by_date_seq += 1;
        let seq = self.by_date_seq;
        self.by_date = Content::Loading;
        Task::perform(
            fetch_window(self.client.clone(), self.config.clone(), Window { start, end }),
            move |result| Message::RangeLoaded(seq, result),
        )
    }

    /// Queue preview downloads for posts we have no image for yet.
    fn fetch_previews(&self, posts: &[Post]) -> Task<Message> {
        let mut tasks = Vec::new();

        for post in posts {
            if self.previews.contains_key(&post.date) {
                continue;
            }
            let Some(url) = post.url.clone() else {
                continue;
            };
            let date = post.date.clone();
            tasks.push(Task::perform(
                media::load_preview(self.client.clone(), date.clone(), url),
                move |path| Message::PreviewLoaded(date.clone(), path),
            ));
        }

        Task::batch(tasks)
    }

    /// One entry of the bottom navigation bar.
    fn nav_button(&self, label: &'static str, tab: Tab) -> Element<Message> {
        let style = if self.tab == tab {
            button::primary
        } else {
            button::secondary
        };
        button(text(label).size(14))
            .style(style)
            .on_press(Message::TabSelected(tab))
            .into()
    }

    /// The start/end inputs of the custom-range page.
    fn range_inputs(&self) -> Element<Message> {
        row![
            text_input("YYYY-MM-DD", &self.start_input)
                .on_input(Message::StartDateChanged)
                .width(150.0),
            text("to"),
            text_input("YYYY-MM-DD", &self.end_input)
                .on_input(Message::EndDateChanged)
                .width(150.0),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
    }
}

fn main() -> iced::Result {
    iced::application("Stargram", Stargram::update, Stargram::view)
        .theme(Stargram::theme)
        .centered()
        .run_with(Stargram::new)
}
