use crate::auth::AuthStore;
use crate::config::Config;
use crate::feed::Post;
use crate::onboarding::OnboardingFlow;
use crate::playback::{HttpStreamOpener, PlaybackController, PlaybackError, StreamPlayer};
use crate::storage::Database;
use crate::talkback::{TalkBackField, TalkBackForm};
use crate::theme::ColorPalette;
use anyhow::Result;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Status messages stay on screen this long.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Volume change for the fine volume keys.
pub const VOLUME_STEP: f32 = 0.1;

/// Create HTTP redirect policy with security constraints
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

// ============================================================================
// Screens and Tabs
// ============================================================================

/// Top-level screen: the first-run wizard or the tabbed station UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Onboarding,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Radio,
    Xperience,
    Share,
    TalkBack,
    Profile,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Radio,
        Tab::Xperience,
        Tab::Share,
        Tab::TalkBack,
        Tab::Profile,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Radio => "Radio",
            Tab::Xperience => "Xperience",
            Tab::Share => "Share",
            Tab::TalkBack => "Talk Back",
            Tab::Profile => "Profile",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ============================================================================
// Screen State
// ============================================================================

/// Xperience feed contents. A refetch replaces `Loaded` wholesale.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Loaded(Vec<Post>),
    Failed(String),
}

/// Which control on the Talk Back tab receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkBackFocus {
    Kind,
    Field(TalkBackField),
}

impl TalkBackFocus {
    pub fn next(self) -> Self {
        match self {
            TalkBackFocus::Kind => TalkBackFocus::Field(TalkBackField::Name),
            TalkBackFocus::Field(TalkBackField::Message) => TalkBackFocus::Kind,
            TalkBackFocus::Field(field) => TalkBackFocus::Field(field.next()),
        }
    }

    pub fn prev(self) -> Self {
        match self {
            TalkBackFocus::Kind => TalkBackFocus::Field(TalkBackField::Message),
            TalkBackFocus::Field(TalkBackField::Name) => TalkBackFocus::Kind,
            TalkBackFocus::Field(TalkBackField::Email) => TalkBackFocus::Field(TalkBackField::Name),
            TalkBackFocus::Field(TalkBackField::Message) => {
                TalkBackFocus::Field(TalkBackField::Email)
            }
        }
    }
}

/// Overlay that captures all input until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Alert { title: String, message: String },
    ConfirmSignOut,
}

/// Events from background tasks
pub enum AppEvent {
    FeedLoaded(Result<Vec<Post>, String>),
    StreamOpened(Result<StreamPlayer, PlaybackError>),
    /// The pause after "link sent" is over; sign in and finish onboarding.
    OnboardingDelayElapsed,
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub config: Config,
    pub http_client: reqwest::Client,
    /// `None` when audio is disabled.
    pub stream_opener: Option<Arc<HttpStreamOpener>>,
    pub palette: ColorPalette,

    pub screen: Screen,
    pub tab: Tab,

    pub auth: AuthStore<Database>,
    pub onboarding: OnboardingFlow,
    /// Validation message shown under the onboarding input.
    pub onboarding_error: Option<String>,

    pub playback: PlaybackController<StreamPlayer>,

    pub feed: FeedState,
    pub selected_post: usize,

    pub talkback: TalkBackForm,
    pub talkback_focus: TalkBackFocus,

    pub selected_share: usize,

    pub modal: Option<Modal>,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(db: Database, config: Config, audio_enabled: bool) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(30))
            .build()?;

        // The stream body never completes, so no total timeout here
        let stream_opener = if audio_enabled {
            let stream_client = reqwest::Client::builder()
                .redirect(create_redirect_policy())
                .connect_timeout(Duration::from_secs(15))
                .tcp_keepalive(Duration::from_secs(60))
                .build()?;
            Some(Arc::new(HttpStreamOpener::new(stream_client)))
        } else {
            None
        };

        let playback = PlaybackController::new(config.initial_volume);

        Ok(Self {
            config,
            http_client,
            stream_opener,
            palette: ColorPalette::default(),
            screen: Screen::Onboarding,
            tab: Tab::Radio,
            auth: AuthStore::new(db),
            onboarding: OnboardingFlow::new(),
            onboarding_error: None,
            playback,
            feed: FeedState::Loading,
            selected_post: 0,
            talkback: TalkBackForm::new(),
            talkback_focus: TalkBackFocus::Kind,
            selected_share: 0,
            modal: None,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        })
    }

    /// Reads the onboarding flag and the stored profile, and picks the
    /// starting screen. Storage failures fall back to onboarding as a guest.
    pub async fn restore(&mut self) {
        let completed = match self.auth.settings().onboarding_completed().await {
            Ok(completed) => completed,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read onboarding flag");
                false
            }
        };
        self.auth.load().await;
        self.screen = if completed {
            Screen::Main
        } else {
            Screen::Onboarding
        };
        tracing::info!(
            onboarding_completed = completed,
            signed_in = self.auth.is_signed_in(),
            "Session restored"
        );
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.modal = Some(Modal::Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    /// True when key presses should go into a text field.
    pub fn is_typing(&self) -> bool {
        match self.screen {
            Screen::Onboarding => self.onboarding.has_input(),
            Screen::Main => {
                self.tab == Tab::TalkBack && matches!(self.talkback_focus, TalkBackFocus::Field(_))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Xperience
    // ------------------------------------------------------------------------

    pub fn posts(&self) -> &[Post] {
        match &self.feed {
            FeedState::Loaded(posts) => posts,
            _ => &[],
        }
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.posts().get(self.selected_post)
    }

    pub fn nav_down(&mut self) {
        let len = self.posts().len();
        if len > 0 && self.selected_post + 1 < len {
            self.selected_post += 1;
        }
    }

    pub fn nav_up(&mut self) {
        self.selected_post = self.selected_post.saturating_sub(1);
    }

    /// Shows the loading indicator until the next result arrives.
    pub fn begin_feed_load(&mut self) {
        self.feed = FeedState::Loading;
    }

    /// Applies a fetch result. Results land in completion order, so the most
    /// recently finished fetch wins.
    pub fn apply_feed_result(&mut self, result: Result<Vec<Post>, String>) {
        match result {
            Ok(posts) => {
                tracing::info!(count = posts.len(), "Feed loaded");
                if self.selected_post >= posts.len() {
                    self.selected_post = posts.len().saturating_sub(1);
                }
                self.feed = FeedState::Loaded(posts);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Feed load failed");
                self.selected_post = 0;
                self.feed = FeedState::Failed(e);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Radio
    // ------------------------------------------------------------------------

    pub fn volume_up(&mut self) {
        self.playback.set_volume(step_volume(self.playback.volume(), VOLUME_STEP));
    }

    pub fn volume_down(&mut self) {
        self.playback.set_volume(step_volume(self.playback.volume(), -VOLUME_STEP));
    }

    // ------------------------------------------------------------------------
    // Share
    // ------------------------------------------------------------------------

    pub fn share_down(&mut self) {
        if self.selected_share + 1 < crate::share::ShareTarget::ALL.len() {
            self.selected_share += 1;
        }
    }

    pub fn share_up(&mut self) {
        self.selected_share = self.selected_share.saturating_sub(1);
    }
}

/// Adds `delta` and rounds to the nearest 10%, so repeated steps land on
/// the presets exactly.
fn step_volume(current: f32, delta: f32) -> f32 {
    ((current + delta) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::OnboardingStep;
    use pretty_assertions::assert_eq;
    use tokio::time;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        App::new(db, Config::default(), false).unwrap()
    }

    fn post(id: usize) -> Post {
        Post {
            id: id.to_string(),
            title: format!("Post {id}"),
            link: format!("https://radioradiox.com/{id}"),
            excerpt: String::new(),
            author: "DJ".to_string(),
            date: String::new(),
            category: "NEWS".to_string(),
        }
    }

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Profile.next(), Tab::Radio);
        assert_eq!(Tab::Radio.prev(), Tab::Profile);
        assert_eq!(Tab::Share.next(), Tab::TalkBack);
        assert_eq!(Tab::TalkBack.index(), 3);
    }

    #[test]
    fn test_talkback_focus_cycle() {
        let mut focus = TalkBackFocus::Kind;
        let mut seen = vec![focus];
        for _ in 0..3 {
            focus = focus.next();
            seen.push(focus);
        }
        assert_eq!(
            seen,
            vec![
                TalkBackFocus::Kind,
                TalkBackFocus::Field(TalkBackField::Name),
                TalkBackFocus::Field(TalkBackField::Email),
                TalkBackFocus::Field(TalkBackField::Message),
            ]
        );
        assert_eq!(focus.next(), TalkBackFocus::Kind);
        assert_eq!(TalkBackFocus::Kind.prev(), focus);
    }

    #[test]
    fn test_step_volume_lands_on_presets() {
        let mut v = 0.0;
        for _ in 0..5 {
            v = step_volume(v, VOLUME_STEP);
        }
        assert_eq!(v, 0.5);
        assert_eq!(step_volume(0.5, -VOLUME_STEP), 0.4);
    }

    #[tokio::test]
    async fn test_fresh_store_starts_onboarding_as_guest() {
        let mut app = test_app().await;
        app.restore().await;
        assert_eq!(app.screen, Screen::Onboarding);
        assert!(!app.auth.is_signed_in());
        assert_eq!(app.onboarding.step(), OnboardingStep::Welcome);
    }

    #[tokio::test]
    async fn test_completed_flag_starts_main() {
        let mut app = test_app().await;
        app.auth
            .settings()
            .mark_onboarding_completed()
            .await
            .unwrap();
        app.restore().await;
        assert_eq!(app.screen, Screen::Main);
    }

    #[tokio::test]
    async fn test_volume_keys_clamp() {
        let mut app = test_app().await;
        app.volume_up();
        assert_eq!(app.playback.volume(), 1.0);
        for _ in 0..15 {
            app.volume_down();
        }
        assert_eq!(app.playback.volume(), 0.0);
    }

    #[tokio::test]
    async fn test_feed_result_replaces_posts_and_clamps_selection() {
        let mut app = test_app().await;
        app.apply_feed_result(Ok((0..5).map(post).collect()));
        app.selected_post = 4;

        app.apply_feed_result(Ok((0..2).map(post).collect()));
        assert_eq!(app.posts().len(), 2);
        assert_eq!(app.selected_post, 1);

        app.apply_feed_result(Err("offline".to_string()));
        assert_eq!(app.feed, FeedState::Failed("offline".to_string()));
        assert!(app.selected_post().is_none());
    }

    #[tokio::test]
    async fn test_nav_stays_in_bounds() {
        let mut app = test_app().await;
        app.nav_down();
        assert_eq!(app.selected_post, 0);

        app.apply_feed_result(Ok((0..2).map(post).collect()));
        app.nav_down();
        app.nav_down();
        assert_eq!(app.selected_post, 1);
        app.nav_up();
        app.nav_up();
        assert_eq!(app.selected_post, 0);
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app().await;
        time::pause();

        app.set_status("Hello");
        assert!(!app.clear_expired_status());

        time::advance(Duration::from_millis(2900)).await;
        assert!(!app.clear_expired_status());

        time::advance(Duration::from_millis(200)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_typing_only_in_text_fields() {
        let mut app = test_app().await;
        app.screen = Screen::Main;
        app.tab = Tab::TalkBack;
        assert!(!app.is_typing());
        app.talkback_focus = TalkBackFocus::Field(TalkBackField::Message);
        assert!(app.is_typing());
        app.tab = Tab::Radio;
        assert!(!app.is_typing());
    }
}
