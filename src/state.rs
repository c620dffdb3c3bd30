//! Application state: the poem store, configuration and the per-user sessions.
//!
//! This module owns:
//!   - the poem store (loaded once at startup, read-only afterwards)
//!   - the workshop config (from TOML or defaults)
//!   - the session map (id -> session), each session behind its own lock
//!
//! Sessions never share mutable state; the map lock is only held long
//! enough to insert, sweep or look up entries. Sessions idle for longer than
//! `[sessions] idle_secs` are swept whenever a new one opens.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use rand::{rngs::SmallRng, Rng, SeedableRng};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::appreciation::AppreciationNotes;
use crate::config::{load_config_from_env, HistoryCfg, WorkshopConfig};
use crate::creation::CreatedPoem;
use crate::domain::Screen;
use crate::quiz::{GradingPolicy, QuizEngine};
use crate::session::SessionState;
use crate::store::PoemStore;

/// Everything one user's visit holds: navigation, quiz, counters and the
/// random source used by all of them.
pub struct Session {
    pub id: String,
    pub screen: Screen,
    pub quiz: QuizEngine,
    pub state: SessionState,
    pub selected_poem: usize,
    pub notes: Option<AppreciationNotes>,
    pub last_creation: Option<CreatedPoem>,
    pub last_rating: Option<u8>,
    /// Simulated mastery percentage per poem, drawn once at session start.
    pub mastery: Vec<u8>,
    pub history: HistoryCfg,
    pub rng: SmallRng,
    pub last_seen: Instant,
}

impl Session {
    pub fn new(id: String, store: &PoemStore, config: &WorkshopConfig, mut rng: SmallRng) -> Self {
        let mastery = (0..store.len()).map(|_| rng.gen_range(30..=100u8)).collect();
        Self {
            id,
            screen: Screen::Home,
            quiz: QuizEngine::new(GradingPolicy::from_lenient(config.grading.lenient)),
            state: SessionState::new(),
            selected_poem: 0,
            notes: None,
            last_creation: None,
            last_rating: None,
            mastery,
            history: config.history,
            rng,
            last_seen: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

pub struct AppState {
    pub store: Arc<PoemStore>,
    pub config: WorkshopConfig,
    sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
    opened: AtomicU64,
}

impl AppState {
    /// Build state from env: load config, then the poem data it points at.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_config_from_env();
        let store = PoemStore::load(&config.data_path);
        let stats = store.stats();
        info!(
            target: "tangshi_workshop",
            path = %config.data_path,
            poems = stats.total,
            authors = stats.distinct_author_count,
            avg_len = %format!("{:.1}", stats.average_content_length),
            rejected = store.rejected().len(),
            "Startup poem inventory"
        );
        Self::with_store(store, config)
    }

    pub fn with_store(store: PoemStore, config: WorkshopConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            opened: AtomicU64::new(0),
        }
    }

    fn session_rng(&self) -> SmallRng {
        let ordinal = self.opened.fetch_add(1, Ordering::Relaxed);
        match self.config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(ordinal)),
            None => SmallRng::from_entropy(),
        }
    }

    fn idle_limit(&self) -> Duration {
        Duration::from_secs(self.config.sessions.idle_secs)
    }

    /// Create and register a fresh session, sweeping idle ones first.
    #[instrument(level = "info", skip(self))]
    pub async fn open_session(&self) -> SharedSession {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), &self.store, &self.config, self.session_rng());
        let shared = Arc::new(Mutex::new(session));
        let (evicted, live) = {
            let mut sessions = self.sessions.write().await;
            let evicted = sweep_idle(&mut sessions, Instant::now(), self.idle_limit());
            sessions.insert(id.clone(), shared.clone());
            (evicted, sessions.len())
        };
        if evicted > 0 {
            info!(target: "tangshi_workshop", evicted, "Idle sessions evicted");
        }
        info!(target: "tangshi_workshop", %id, live, "Session opened");
        shared
    }

    /// Look up a session and mark it as seen.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn session(&self, id: &str) -> Option<SharedSession> {
        let found = self.sessions.read().await.get(id).cloned();
        match found {
            Some(shared) => {
                shared.lock().await.touch();
                Some(shared)
            }
            None => {
                debug!(target: "tangshi_workshop", %id, "Unknown session id");
                None
            }
        }
    }

    /// Drop every session idle for at least `idle_secs` as of `now`.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let evicted = {
            let mut sessions = self.sessions.write().await;
            sweep_idle(&mut sessions, now, self.idle_limit())
        };
        if evicted > 0 {
            info!(target: "tangshi_workshop", evicted, "Idle sessions evicted");
        }
        evicted
    }

    /// Background sweep so idle sessions go away even when nobody opens new ones.
    pub fn spawn_idle_sweeper(self: Arc<Self>) {
        let period = self.idle_limit().clamp(Duration::from_secs(1), Duration::from_secs(60));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            loop {
                tick.tick().await;
                self.evict_idle(Instant::now()).await;
            }
        });
    }

    /// Drop a session (WS disconnect).
    pub async fn close_session(&self, id: &str) {
        if self.sessions.write().await.remove(id).is_some() {
            info!(target: "tangshi_workshop", %id, "Session closed");
        }
    }
}

/// Sessions locked by an in-flight request are in use and always kept.
fn sweep_idle(sessions: &mut HashMap<String, SharedSession>, now: Instant, idle: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, shared| match shared.try_lock() {
        Ok(session) => now.saturating_duration_since(session.last_seen) < idle,
        Err(_) => true,
    });
    before - sessions.len()
}
