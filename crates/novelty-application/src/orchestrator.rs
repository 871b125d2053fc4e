//! Generation orchestrator.
//!
//! Sequences the idea call and the per-idea image calls for each submission
//! and keeps the authoritative [`GenerationSession`].
//!
//! # Ownership of the session
//!
//! The session lives in a `watch` channel. Background work never touches it
//! directly: the text task and every image task report through an mpsc
//! channel of [`SessionEvent`]s, drained by one reducer task that applies
//! them in arrival order. The only other write is the synchronous `Started`
//! transition performed by [`GenerationOrchestrator::submit`], which goes
//! through the same reducer function.

use crate::progress::{ProgressSimulator, ProgressState};
use crate::session::{GenerationSession, GenerationView, ImageOutcome, SessionEvent};
use futures::FutureExt;
use novelty_core::config::GenerationSettings;
use novelty_core::error::NoveltyError;
use novelty_core::idea::{Idea, IdeaId, IdeaSource, ImageSynthesizer, SessionToken};
use novelty_core::user::UserService;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

/// Drives idea generation for one user, one submission at a time.
///
/// A new submission supersedes the previous one: its text call is aborted,
/// and results still arriving from its image calls are discarded.
pub struct GenerationOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    idea_source: Arc<dyn IdeaSource>,
    image_synthesizer: Arc<dyn ImageSynthesizer>,
    user_service: Arc<dyn UserService>,
    settings: GenerationSettings,
    progress: ProgressSimulator,
    session: Arc<watch::Sender<GenerationSession>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    /// Token of the most recent accepted submission
    current_token: AtomicU64,
    /// Text task of the current submission. Its lock also serializes
    /// submissions against token checks in the text task.
    text_task: Mutex<Option<JoinHandle<()>>>,
}

impl GenerationOrchestrator {
    /// Creates the orchestrator and spawns its reducer task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        idea_source: Arc<dyn IdeaSource>,
        image_synthesizer: Arc<dyn ImageSynthesizer>,
        user_service: Arc<dyn UserService>,
        settings: GenerationSettings,
    ) -> Self {
        let (session, _) = watch::channel(GenerationSession::default());
        let session = Arc::new(session);
        let (events, receiver) = mpsc::unbounded_channel();

        tokio::spawn(run_reducer(Arc::clone(&session), receiver));

        let progress = ProgressSimulator::new(settings.progress.clone());
        Self {
            inner: Arc::new(Inner {
                idea_source,
                image_synthesizer,
                user_service,
                settings,
                progress,
                session,
                events,
                current_token: AtomicU64::new(0),
                text_task: Mutex::new(None),
            }),
        }
    }

    /// Starts a new generation for `keywords`.
    ///
    /// Blank input is ignored and returns `None` without touching any state.
    /// Otherwise the session is already `loading` when this returns.
    pub fn submit(&self, keywords: &str) -> Option<SessionToken> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            tracing::debug!("Ignoring blank submission");
            return None;
        }

        let mut text_task = self.inner.lock_text_task();
        if let Some(previous) = text_task.take() {
            previous.abort();
        }

        let previous = self.inner.current_token.fetch_add(1, Ordering::SeqCst);
        let token = SessionToken(previous).next();
        self.inner.session.send_if_modified(|session| {
            session.apply(SessionEvent::Started {
                token,
                keywords: keywords.to_string(),
            })
        });
        self.inner.progress.start();

        tracing::info!(%token, keywords, "Generation submitted");

        let inner = Arc::clone(&self.inner);
        let keywords = keywords.to_string();
        *text_task = Some(tokio::spawn(async move {
            inner.run_generation(token, keywords).await;
        }));

        Some(token)
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> GenerationSession {
        self.inner.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationSession> {
        self.inner.session.subscribe()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressState> {
        self.inner.progress.subscribe()
    }

    /// Combined snapshot for the presentation layer.
    pub fn view(&self) -> GenerationView {
        GenerationView::new(&self.inner.session.borrow(), &self.inner.progress.state())
    }

    pub fn current_token(&self) -> SessionToken {
        SessionToken(self.inner.current_token.load(Ordering::SeqCst))
    }

    /// Waits until the current submission is done or has failed.
    ///
    /// Returns immediately with the idle session if nothing was submitted.
    pub async fn settled(&self) -> GenerationSession {
        let mut receiver = self.subscribe();
        loop {
            {
                let session = receiver.borrow_and_update();
                if session.phase.is_terminal() || self.current_token() == SessionToken::default() {
                    return session.clone();
                }
            }
            if receiver.changed().await.is_err() {
                return receiver.borrow().clone();
            }
        }
    }

    /// Stops the progress ticker and aborts the outstanding text call.
    ///
    /// Image calls already fired keep running; their results land on a
    /// session nobody is watching. Idempotent.
    pub fn shutdown(&self) {
        let mut text_task = self.inner.lock_text_task();
        if let Some(task) = text_task.take() {
            task.abort();
        }
        self.inner.progress.stop();
        tracing::debug!("Generation orchestrator shut down");
    }
}

impl Drop for GenerationOrchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn lock_text_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.text_task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` only if `token` still identifies the current submission.
    ///
    /// Holding the submission lock keeps a concurrent `submit` from starting
    /// a new progress run between the check and `f`.
    fn if_current(&self, token: SessionToken, f: impl FnOnce(&Self)) -> bool {
        let _guard = self.lock_text_task();
        if self.current_token.load(Ordering::SeqCst) != token.0 {
            tracing::debug!(%token, "Submission superseded");
            return false;
        }
        f(self);
        true
    }

    fn send(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Session reducer has stopped; dropping event");
        }
    }

    async fn run_generation(self: Arc<Self>, token: SessionToken, keywords: String) {
        let profile = self.user_service.get_user_profile();
        let result = AssertUnwindSafe(self.idea_source.generate_ideas(&keywords, &profile))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(NoveltyError::internal("Idea generation panicked")))
            .and_then(|drafts| {
                if drafts.is_empty() {
                    Err(NoveltyError::EmptyResponse)
                } else {
                    Ok(drafts)
                }
            });

        let drafts = match result {
            Ok(drafts) => drafts,
            Err(err) => {
                tracing::error!(%token, "Idea generation failed: {}", err);
                self.if_current(token, |inner| {
                    inner.progress.stop();
                });
                self.send(SessionEvent::TextFailed {
                    token,
                    message: err.to_string(),
                });
                return;
            }
        };

        if !self.if_current(token, |inner| inner.progress.complete()) {
            return;
        }

        // Let the completed bar register before the cards replace it.
        tokio::time::sleep(self.settings.reveal_delay()).await;

        let ideas: Vec<Idea> = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| draft.into_idea(IdeaId::new(token, index)))
            .collect();

        tracing::info!(%token, count = ideas.len(), "Ideas ready, requesting images");

        // Publish before firing so no image result can precede its idea.
        self.send(SessionEvent::IdeasReady {
            token,
            ideas: ideas.clone(),
        });
        self.spawn_image_tasks(token, &ideas);
    }

    /// Fires one image call per idea and forwards each result as it lands.
    ///
    /// The forwarding task is detached from the text task, so aborting a
    /// superseded submission never cancels image calls already in flight.
    fn spawn_image_tasks(&self, token: SessionToken, ideas: &[Idea]) {
        let mut tasks = JoinSet::new();
        for idea in ideas {
            let synthesizer = Arc::clone(&self.image_synthesizer);
            let id = idea.id.clone();
            let visual_prompt = idea.visual_prompt.clone();
            tasks.spawn(async move {
                let outcome = synthesize_image(synthesizer.as_ref(), &id, &visual_prompt).await;
                (id, outcome)
            });
        }

        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((id, outcome)) => {
                        let event = SessionEvent::ImageResolved { token, id, outcome };
                        if events.send(event).is_err() {
                            tracing::debug!(%token, "Session reducer has stopped");
                        }
                    }
                    Err(err) => tracing::warn!(%token, "Image task did not complete: {}", err),
                }
            }
        });
    }
}

/// Calls the synthesizer and folds every failure mode into `Unavailable`.
async fn synthesize_image(
    synthesizer: &dyn ImageSynthesizer,
    id: &IdeaId,
    visual_prompt: &str,
) -> ImageOutcome {
    match AssertUnwindSafe(synthesizer.synthesize(visual_prompt))
        .catch_unwind()
        .await
    {
        Ok(Ok(Some(url))) => {
            tracing::debug!(%id, "Image ready");
            ImageOutcome::Ready(url)
        }
        Ok(Ok(None)) => {
            tracing::warn!(%id, "Image model returned no image");
            ImageOutcome::Unavailable
        }
        Ok(Err(err)) => {
            tracing::warn!(%id, "Failed to generate image: {}", err);
            ImageOutcome::Unavailable
        }
        Err(_) => {
            tracing::warn!(%id, "Image synthesis panicked");
            ImageOutcome::Unavailable
        }
    }
}

async fn run_reducer(
    session: Arc<watch::Sender<GenerationSession>>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
) {
    while let Some(event) = events.recv().await {
        session.send_if_modified(|current| current.apply(event));
    }
    tracing::debug!("Session reducer stopped");
}
