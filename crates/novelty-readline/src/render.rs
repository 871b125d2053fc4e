//! Terminal projection of a generation session.
//!
//! The session and progress channels publish whole snapshots; [`Renderer`]
//! remembers what it already printed so each snapshot only yields the lines
//! that are new.

use colored::Colorize;
use novelty_application::{GenerationSession, ProgressState, SessionPhase};
use novelty_core::idea::{Idea, IdeaId, SessionToken};
use novelty_interaction::data_uri;
use std::collections::HashSet;
use tokio::sync::watch;

const BAR_WIDTH: usize = 20;

/// Tracks what has been printed for the current session.
#[derive(Debug, Default)]
pub struct Renderer {
    token: SessionToken,
    last_status: String,
    cards_printed: bool,
    resolved: HashSet<IdeaId>,
    error_printed: bool,
    done_printed: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print for a new session snapshot.
    pub fn on_session(&mut self, session: &GenerationSession) -> Vec<String> {
        let mut lines = Vec::new();

        if session.token != self.token {
            *self = Self {
                token: session.token,
                ..Self::default()
            };
            if session.phase != SessionPhase::Idle {
                lines.push(
                    format!("Architecting ideas for \"{}\"...", session.keywords)
                        .bright_magenta()
                        .to_string(),
                );
            }
        }

        if let Some(error) = &session.error
            && !self.error_printed
        {
            lines.push(format!("Error: {error}").red().to_string());
            self.error_printed = true;
        }

        if !session.ideas.is_empty() && !self.cards_printed {
            for (index, idea) in session.ideas.iter().enumerate() {
                lines.extend(render_card(index + 1, idea));
                if !idea.loading_image {
                    self.resolved.insert(idea.id.clone());
                }
            }
            self.cards_printed = true;
        }

        for (index, idea) in session.ideas.iter().enumerate() {
            if idea.loading_image || self.resolved.contains(&idea.id) {
                continue;
            }
            lines.push(format!("[{}] {}: {}", index + 1, idea.title.bold(), image_line(idea)));
            self.resolved.insert(idea.id.clone());
        }

        if session.phase == SessionPhase::Done && !self.done_printed {
            lines.push("All images resolved.".bright_green().to_string());
            self.done_printed = true;
        }

        lines
    }

    /// A progress line when the status text changes, otherwise nothing.
    pub fn on_progress(&mut self, progress: &ProgressState) -> Option<String> {
        if progress.status.is_empty() || progress.status == self.last_status {
            return None;
        }
        self.last_status = progress.status.clone();
        Some(progress_line(progress))
    }
}

/// Feeds session and progress changes through a [`Renderer`] until either
/// channel closes, or until the session settles when `until_settled` is set.
pub async fn render_loop(
    mut sessions: watch::Receiver<GenerationSession>,
    mut progress: watch::Receiver<ProgressState>,
    until_settled: bool,
    mut emit: impl FnMut(String),
) -> GenerationSession {
    let mut renderer = Renderer::new();
    loop {
        tokio::select! {
            changed = sessions.changed() => {
                if changed.is_err() {
                    break;
                }
                let session = sessions.borrow_and_update().clone();
                renderer.on_session(&session).into_iter().for_each(&mut emit);
                if until_settled && session.phase.is_terminal() {
                    return session;
                }
            }
            changed = progress.changed() => {
                if changed.is_err() {
                    break;
                }
                // A submission publishes its session before restarting progress;
                // render that first so the new run's status line is not
                // deduplicated against the previous run's.
                if sessions.has_changed().unwrap_or(false) {
                    let session = sessions.borrow_and_update().clone();
                    renderer.on_session(&session).into_iter().for_each(&mut emit);
                    if until_settled && session.phase.is_terminal() {
                        return session;
                    }
                }
                let state = progress.borrow_and_update().clone();
                if let Some(line) = renderer.on_progress(&state) {
                    emit(line);
                }
            }
        }
    }
    sessions.borrow().clone()
}

/// `[#####...............]  25% Searching prior art and patents...`
pub fn progress_line(progress: &ProgressState) -> String {
    let value = progress.value.clamp(0.0, 100.0);
    let filled = ((value / 100.0) * BAR_WIDTH as f64).round() as usize;
    let bar = format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
    format!("[{}] {:>3.0}% {}", bar.cyan(), value, progress.status.bright_black())
}

/// Full card for one idea, numbered from 1.
pub fn render_card(number: usize, idea: &Idea) -> Vec<String> {
    vec![
        String::new(),
        format!("[{number}] {}  ({})", idea.title.bold().bright_blue(), idea.domain.yellow()),
        format!("    {} {}", "Novelty:       ".bright_black(), idea.summary.novelty),
        format!("    {} {}", "Description:   ".bright_black(), idea.summary.description),
        format!("    {} {}", "Prior art:     ".bright_black(), idea.summary.prior_art_difference),
        format!("    {} {}", "Implementation:".bright_black(), idea.summary.implementation),
        format!("    {}", image_line(idea)),
    ]
}

/// Image state of one card.
pub fn image_line(idea: &Idea) -> String {
    if idea.loading_image {
        return "image pending...".bright_black().to_string();
    }
    match idea.image_url.as_deref() {
        Some(url) => match data_uri::decode(url) {
            Some(image) => format!("image ready ({}, {} bytes)", image.mime_type, image.bytes.len())
                .green()
                .to_string(),
            None => format!("image ready ({url})").green().to_string(),
        },
        None => "image unavailable".yellow().to_string(),
    }
}
