use blob_poster::{
    LayoutStyle, PosterConfig, PosterError, PosterParams, PosterPipeline, PosterSession, Wobble, poster_rng,
};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Slider ranges exposed by the studio page: (min, max, default).
pub const SEED_SLIDER: (u64, u64, u64) = (1, 1000, 42);
pub const LAYER_SLIDER: (usize, usize, usize) = (1, 12, 8);
pub const WOBBLE_SLIDER: (f64, f64, f64) = (0.05, 0.4, 0.2);

#[cfg(feature = "web")]
mod web;
#[cfg(feature = "web")]
pub use web::{AppState, app, start_server};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub poster: PosterConfig,
    /// Sessions untouched for this long are dropped by the server's sweeper.
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            poster: PosterConfig::default(),
            session_ttl: Duration::from_secs(60 * 60),
        }
    }
}

/// What the page shows about a session after each action.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
pub struct SessionSummary {
    pub blob_count: usize,
    pub palette: Vec<String>,
}

impl SessionSummary {
    fn of(session: &PosterSession) -> Self {
        Self {
            blob_count: session.blobs().len(),
            palette: session.palette().colors().iter().map(|c| c.to_css()).collect(),
        }
    }
}

struct StoredSession {
    session: PosterSession,
    last_seen: Instant,
}

/// Per-user sessions keyed by a client-chosen id. Only actions create a
/// session; reads work on snapshots. Idle sessions are removed with
/// [`SessionStore::evict_idle`].
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, StoredSession>>>,
    palette_size: usize,
}

impl SessionStore {
    pub fn new(palette_size: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            palette_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredSession>> {
        // A panic mid-action leaves the map itself consistent.
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` on the session `id`, creating it with a fresh palette if needed.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut PosterSession) -> T) -> T {
        let mut sessions = self.lock();
        let stored = sessions.entry(id.to_string()).or_insert_with(|| {
            info!("new studio session {id}");
            StoredSession {
                session: PosterSession::new(self.palette_size, &mut poster_rng(None)),
                last_seen: Instant::now(),
            }
        });
        stored.last_seen = Instant::now();
        f(&mut stored.session)
    }

    /// A copy of session `id` as it is now, without creating it.
    pub fn snapshot(&self, id: &str) -> Option<PosterSession> {
        let mut sessions = self.lock();
        let stored = sessions.get_mut(id)?;
        stored.last_seen = Instant::now();
        Some(stored.session.clone())
    }

    /// Summary of session `id`; an unknown id reads as an empty session.
    pub fn summary(&self, id: &str) -> SessionSummary {
        self.snapshot(id).map(|s| SessionSummary::of(&s)).unwrap_or_default()
    }

    pub fn add_blob(&self, id: &str) -> SessionSummary {
        self.with_session(id, |s| {
            s.add_random_blob(&mut poster_rng(None));
            SessionSummary::of(s)
        })
    }

    pub fn reset(&self, id: &str) -> SessionSummary {
        self.with_session(id, |s| {
            s.reset();
            SessionSummary::of(s)
        })
    }

    pub fn regenerate_palette(&self, id: &str) -> SessionSummary {
        let size = self.palette_size;
        self.with_session(id, |s| {
            s.regenerate_palette(size, &mut poster_rng(None));
            SessionSummary::of(s)
        })
    }

    /// Drops sessions not touched within `max_idle`; returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, stored| stored.last_seen.elapsed() < max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("evicted {evicted} idle studio sessions, {} left", sessions.len());
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Query string of a poster request. Missing values fall back to the slider
/// defaults and out-of-range values are clamped to the sliders.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "web", derive(serde::Deserialize))]
pub struct PosterQuery {
    pub sid: Option<String>,
    pub seed: Option<u64>,
    pub layers: Option<usize>,
    pub wobble: Option<f64>,
    pub style: Option<String>,
}

impl PosterQuery {
    pub fn params(&self) -> PosterParams {
        let (seed_min, seed_max, seed_default) = SEED_SLIDER;
        let (layers_min, layers_max, layers_default) = LAYER_SLIDER;
        let (wobble_min, wobble_max, wobble_default) = WOBBLE_SLIDER;
        let wobble = self
            .wobble
            .filter(|w| w.is_finite())
            .unwrap_or(wobble_default)
            .clamp(wobble_min, wobble_max);
        PosterParams {
            seed: Some(self.seed.unwrap_or(seed_default).clamp(seed_min, seed_max)),
            layer_count: self.layers.unwrap_or(layers_default).clamp(layers_min, layers_max),
            wobble: Wobble::Fixed(wobble),
        }
    }

    /// `flat` (default), `depth` or `shadow`, applied on top of `base`.
    pub fn layout(&self, base: &LayoutStyle) -> LayoutStyle {
        let styled = match self.style.as_deref() {
            Some("depth") => LayoutStyle::depth(),
            Some("shadow") => LayoutStyle::shadowed(),
            _ => return base.clone(),
        };
        LayoutStyle {
            alpha: styled.alpha,
            shadow: styled.shadow,
            ..base.clone()
        }
    }
}

/// Renders the poster for a query against a snapshot of the caller's
/// session. An unknown session id renders like an anonymous request.
pub fn render_poster_svg(config: &PosterConfig, store: &SessionStore, query: &PosterQuery) -> Result<String, PosterError> {
    let pipeline = PosterPipeline::new(PosterConfig {
        layout: query.layout(&config.layout),
        ..config.clone()
    });
    let session = query.sid.as_deref().and_then(|sid| store.snapshot(sid));
    pipeline.render_svg(&query.params(), session.as_ref())
}

#[cfg(not(feature = "web"))]
pub async fn start_server(_cfg: ServerConfig) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    Err(anyhow::anyhow!("web feature not enabled for poster_studio"))
}
