//! Generation session state and the reducer that evolves it.
//!
//! Every change to a session is expressed as a [`SessionEvent`] and applied
//! through [`GenerationSession::apply`]. Events carry the token of the
//! submission that produced them; events for any other submission are
//! dropped, which is how a re-submission supersedes in-flight work.

use crate::progress::ProgressState;
use novelty_core::idea::{Idea, IdeaId, SessionToken};
use serde::Serialize;

/// Message shown when a failure carries no text of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred while generating ideas.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionPhase {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Waiting for the idea text
    Submitting,
    /// Ideas visible, some images still pending
    TextReady,
    /// Every idea's image call has resolved
    Done,
    /// The text call failed
    Error,
}

impl SessionPhase {
    /// No further events will change the session.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Result of one idea's image call, as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Ready(String),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started {
        token: SessionToken,
        keywords: String,
    },
    IdeasReady {
        token: SessionToken,
        ideas: Vec<Idea>,
    },
    TextFailed {
        token: SessionToken,
        message: String,
    },
    ImageResolved {
        token: SessionToken,
        id: IdeaId,
        outcome: ImageOutcome,
    },
}

impl SessionEvent {
    pub fn token(&self) -> SessionToken {
        match self {
            Self::Started { token, .. }
            | Self::IdeasReady { token, .. }
            | Self::TextFailed { token, .. }
            | Self::ImageResolved { token, .. } => *token,
        }
    }
}

/// State produced by one submit action.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GenerationSession {
    pub token: SessionToken,
    pub keywords: String,
    pub phase: SessionPhase,
    /// Display order
    pub ideas: Vec<Idea>,
    pub loading: bool,
    pub error: Option<String>,
}

impl GenerationSession {
    fn submitting(token: SessionToken, keywords: String) -> Self {
        Self {
            token,
            keywords,
            phase: SessionPhase::Submitting,
            ideas: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// Applies one event. Returns whether the session changed.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        if let SessionEvent::Started { token, keywords } = event {
            if token < self.token {
                tracing::debug!(%token, current = %self.token, "Ignoring out-of-order start");
                return false;
            }
            *self = Self::submitting(token, keywords);
            return true;
        }

        if event.token() != self.token {
            tracing::debug!(
                event_token = %event.token(),
                current = %self.token,
                "Discarding event from a superseded session"
            );
            return false;
        }

        match event {
            SessionEvent::Started { .. } => false,
            SessionEvent::IdeasReady { ideas, .. } => {
                if self.phase != SessionPhase::Submitting {
                    return false;
                }
                self.ideas = ideas;
                self.loading = false;
                self.refresh_phase();
                true
            }
            SessionEvent::TextFailed { message, .. } => {
                if self.phase != SessionPhase::Submitting {
                    return false;
                }
                self.ideas.clear();
                self.loading = false;
                self.error = Some(if message.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE.to_string()
                } else {
                    message
                });
                self.phase = SessionPhase::Error;
                true
            }
            SessionEvent::ImageResolved { id, outcome, .. } => {
                let Some(idea) = self.ideas.iter_mut().find(|idea| idea.id == id) else {
                    tracing::debug!(%id, "Image result for an idea that is no longer listed");
                    return false;
                };
                if !idea.loading_image {
                    return false;
                }
                if let ImageOutcome::Ready(url) = outcome {
                    idea.image_url = Some(url);
                }
                idea.loading_image = false;
                self.refresh_phase();
                true
            }
        }
    }

    /// Ideas whose image call has not resolved yet.
    pub fn pending_images(&self) -> usize {
        self.ideas.iter().filter(|idea| idea.loading_image).count()
    }

    pub fn idea(&self, id: &IdeaId) -> Option<&Idea> {
        self.ideas.iter().find(|idea| &idea.id == id)
    }

    fn refresh_phase(&mut self) {
        self.phase = if self.pending_images() == 0 {
            SessionPhase::Done
        } else {
            SessionPhase::TextReady
        };
    }
}

/// Read-only projection handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationView {
    pub phase: SessionPhase,
    pub keywords: String,
    /// 0–100
    pub progress: f64,
    pub status_text: String,
    pub loading: bool,
    pub error: Option<String>,
    pub ideas: Vec<Idea>,
}

impl GenerationView {
    pub fn new(session: &GenerationSession, progress: &ProgressState) -> Self {
        Self {
            phase: session.phase,
            keywords: session.keywords.clone(),
            progress: progress.value,
            status_text: progress.status.clone(),
            loading: session.loading,
            error: session.error.clone(),
            ideas: session.ideas.clone(),
        }
    }
}
