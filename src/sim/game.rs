/// GameState: the complete state of a running game.
///
/// ## Phases
///
///   NotStarted ──activate──▶ InProgress ──validate (ok)──▶ Won
///                               │
///                               └──validate (3rd miss)──▶ Lost
///
/// `activate` (and `reset` / `advance` / `select_level`, which call it)
/// is the only way out of Won or Lost. `swap` and `validate` are ignored
/// outside InProgress.
///
/// ## Activation token
///
/// Every activation bumps `activation`. Deferred work (the loss reveal,
/// hint replies) records the token it was issued under and is dropped
/// if the token has moved on by the time it lands.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::domain::curriculum::{levels, Level};
use crate::domain::symbol::Symbol;
use crate::sim::event::GameEvent;

/// Validation attempts granted per activation.
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay between losing and the canonical order being revealed.
pub const REVEAL_DELAY: Duration = Duration::from_millis(1200);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug)]
struct PendingReveal {
    due: Instant,
    activation: u64,
}

pub struct GameState {
    pub phase: Phase,
    pub level_idx: usize,
    /// Working order: always a permutation of the level's symbols.
    pub order: Vec<Symbol>,
    pub attempts: u32,
    /// Pass/fail markers from the last validation are on display.
    pub feedback: bool,
    pub activation: u64,
    reveal: Option<PendingReveal>,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl GameState {
    pub fn new() -> Self {
        GameState {
            phase: Phase::NotStarted,
            level_idx: 0,
            order: vec![],
            attempts: MAX_ATTEMPTS,
            feedback: false,
            activation: 0,
            reveal: None,
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the status message; clears it when it expires.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}

// ── Queries ──

impl GameState {
    pub fn level(&self) -> &'static Level {
        &levels()[self.level_idx]
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == Phase::InProgress
    }

    /// Every position holds the symbol that belongs there.
    pub fn is_solved(&self) -> bool {
        self.order.iter().enumerate().all(|(i, s)| s.belongs_at(i))
    }

    pub fn is_correct_at(&self, pos: usize) -> bool {
        self.order.get(pos).map_or(false, |s| s.belongs_at(pos))
    }

    /// Should per-tile pass/fail markers be drawn?
    pub fn feedback_visible(&self) -> bool {
        self.feedback || matches!(self.phase, Phase::Won | Phase::Lost)
    }

    pub fn reveal_pending(&self) -> bool {
        self.reveal.is_some()
    }
}

// ── Transitions ──

impl GameState {
    /// Start (or restart) a level with a freshly shuffled working order.
    pub fn activate<R: Rng + ?Sized>(&mut self, level_idx: usize, rng: &mut R) -> Vec<GameEvent> {
        let count = levels().len();
        self.level_idx = level_idx % count;
        let level = self.level();

        let mut order = level.symbols();
        order.shuffle(rng);

        self.order = order;
        self.attempts = MAX_ATTEMPTS;
        self.feedback = false;
        self.reveal = None;
        self.activation = self.activation.wrapping_add(1);
        self.phase = Phase::InProgress;
        self.message.clear();
        self.message_timer = 0;

        info!(level = level.id, activation = self.activation, "level activated");
        vec![GameEvent::Activated]
    }

    /// Restart the current level.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        self.activate(self.level_idx, rng)
    }

    /// Move to the next level, wrapping after the last one.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<GameEvent> {
        let next = (self.level_idx + 1) % levels().len();
        self.activate(next, rng)
    }

    pub fn select_level<R: Rng + ?Sized>(&mut self, level_idx: usize, rng: &mut R) -> Vec<GameEvent> {
        self.activate(level_idx, rng)
    }

    /// Exchange two positions. Equal or out-of-range indices are a no-op.
    /// Returns whether the working order changed.
    pub fn swap(&mut self, i: usize, j: usize) -> bool {
        if !self.is_in_progress() || i == j || i >= self.order.len() || j >= self.order.len() {
            return false;
        }
        debug!(first = %self.order[i].id, second = %self.order[j].id, from = i, to = j, "swapped");
        self.order.swap(i, j);
        self.feedback = false;
        true
    }

    /// Check the working order against the canonical one.
    pub fn validate(&mut self, now: Instant) -> Vec<GameEvent> {
        if !self.is_in_progress() {
            return vec![];
        }

        self.feedback = true;

        if self.is_solved() {
            self.phase = Phase::Won;
            self.set_message("बहुत बढ़िया! (Excellent!)  [N] Next level", 0);
            info!(level = self.level().id, attempts_left = self.attempts, "level solved");
            return vec![GameEvent::Solved];
        }

        self.attempts = self.attempts.saturating_sub(1);

        if self.attempts == 0 {
            self.phase = Phase::Lost;
            self.reveal = Some(PendingReveal {
                due: now + REVEAL_DELAY,
                activation: self.activation,
            });
            self.set_message("Out of attempts. Correct answer is here.  [R] Try again", 0);
            info!(level = self.level().id, "out of attempts");
            vec![GameEvent::OutOfAttempts]
        } else {
            let msg = format!(
                "Not quite. {} attempt{} left.",
                self.attempts,
                if self.attempts == 1 { "" } else { "s" },
            );
            self.set_message(&msg, 90);
            vec![GameEvent::WrongOrder { remaining: self.attempts }]
        }
    }

    /// Fire the loss reveal once it is due.
    pub fn tick(&mut self, now: Instant) -> Vec<GameEvent> {
        match self.reveal {
            Some(r) if now >= r.due => {
                self.reveal = None;
                if self.fire_reveal(r.activation) {
                    vec![GameEvent::Revealed]
                } else {
                    vec![]
                }
            }
            _ => vec![],
        }
    }

    /// Sort the working order into canonical order, but only if the
    /// activation that lost is still the current one.
    pub fn fire_reveal(&mut self, activation: u64) -> bool {
        if activation != self.activation || self.phase != Phase::Lost {
            debug!(activation, current = self.activation, "stale reveal dropped");
            return false;
        }
        self.order.sort_by_key(|s| s.correct_index);
        true
    }
}
