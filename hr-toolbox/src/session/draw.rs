// Lucky draw engine: spin state machine, remaining pool, winners log.
//
// The engine only decides outcomes. The suspense animation (a fixed number of
// timed ticks) is driven from outside by the app orchestrator, which calls
// `begin_spin`, then `tick_name` per tick, then `settle` once the ticker is
// done. Sampling happens entirely inside `settle`.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::roster::Participant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("add participants before drawing")]
    EmptyRoster,

    #[error("every participant has already won; reset the draw to start over")]
    PoolExhausted,

    #[error("a draw is already in progress")]
    AlreadyRunning,

    #[error("no draw is in progress")]
    NotRunning,
}

/// Where the engine is in its spin cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawPhase {
    /// Ready to spin, nothing drawn since the last reset.
    #[default]
    Idle,
    /// A spin is in progress; no winner has been sampled yet.
    Running,
    /// A winner was just recorded. Accepts the next spin like `Idle`.
    Settled,
}

/// One completed draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub participant: Participant,
    /// 1-based draw number since the last reset.
    pub sequence_number: usize,
}

pub struct DrawEngine {
    allow_duplicates: bool,
    phase: DrawPhase,
    remaining: Vec<Participant>,
    /// Most recent first.
    winners: Vec<WinnerRecord>,
    rng: SmallRng,
}

impl DrawEngine {
    pub fn new(allow_duplicates: bool) -> Self {
        Self::with_rng(allow_duplicates, SmallRng::from_entropy())
    }

    /// Build an engine with a fixed seed (deterministic outcomes for tests).
    pub fn seeded(allow_duplicates: bool, seed: u64) -> Self {
        Self::with_rng(allow_duplicates, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(allow_duplicates: bool, rng: SmallRng) -> Self {
        DrawEngine {
            allow_duplicates,
            phase: DrawPhase::Idle,
            remaining: Vec::new(),
            winners: Vec::new(),
            rng,
        }
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == DrawPhase::Running
    }

    pub fn allow_duplicates(&self) -> bool {
        self.allow_duplicates
    }

    pub fn remaining(&self) -> &[Participant] {
        &self.remaining
    }

    pub fn winners(&self) -> &[WinnerRecord] {
        &self.winners
    }

    /// Switch between drawing with and without replacement.
    pub fn set_allow_duplicates(&mut self, allow: bool) -> Result<(), DrawError> {
        if self.is_running() {
            return Err(DrawError::AlreadyRunning);
        }
        self.allow_duplicates = allow;
        Ok(())
    }

    /// Make the remaining pool equal to the full roster again.
    ///
    /// Called whenever the roster changes. The winners log is kept.
    pub fn sync_pool(&mut self, roster: &[Participant]) {
        self.remaining = roster.to_vec();
        debug!("Draw pool resynced ({} entrants)", self.remaining.len());
    }

    /// Clear the winners log, refill the pool, and return to `Idle`.
    pub fn reset(&mut self, roster: &[Participant]) {
        self.winners.clear();
        self.remaining = roster.to_vec();
        self.phase = DrawPhase::Idle;
        info!("Draw reset ({} entrants)", self.remaining.len());
    }

    /// Start a spin. Rejected while another spin is running or when nobody
    /// is eligible.
    pub fn begin_spin(&mut self, roster: &[Participant]) -> Result<(), DrawError> {
        if self.is_running() {
            return Err(DrawError::AlreadyRunning);
        }
        if roster.is_empty() {
            return Err(DrawError::EmptyRoster);
        }
        if !self.allow_duplicates && self.remaining.is_empty() {
            return Err(DrawError::PoolExhausted);
        }
        self.phase = DrawPhase::Running;
        Ok(())
    }

    /// A random name from the full roster for the suspense display.
    ///
    /// Has no influence on the eventual winner.
    pub fn tick_name(&mut self, roster: &[Participant]) -> Option<String> {
        roster.choose(&mut self.rng).map(|p| p.name.clone())
    }

    /// Abandon a running spin without recording anything.
    pub fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = if self.winners.is_empty() {
            DrawPhase::Idle
        } else {
            DrawPhase::Settled
        };
        true
    }

    /// Sample the winner of the running spin and record it.
    ///
    /// With duplicates allowed the winner is drawn uniformly from the full
    /// roster; otherwise from the remaining pool, and removed from it.
    pub fn settle(&mut self, roster: &[Participant]) -> Result<WinnerRecord, DrawError> {
        if !self.is_running() {
            return Err(DrawError::NotRunning);
        }

        let winner = if self.allow_duplicates {
            roster.choose(&mut self.rng).cloned()
        } else {
            self.take_from_pool()
        };

        let Some(participant) = winner else {
            // Roster or pool emptied between begin_spin and settle.
            self.cancel();
            return Err(if roster.is_empty() {
                DrawError::EmptyRoster
            } else {
                DrawError::PoolExhausted
            });
        };

        let record = WinnerRecord {
            participant,
            sequence_number: self.winners.len() + 1,
        };
        self.winners.insert(0, record.clone());
        self.phase = DrawPhase::Settled;
        info!(
            "Draw #{} won by {} ({} left in pool)",
            record.sequence_number,
            record.participant.name,
            self.remaining.len()
        );
        Ok(record)
    }

    /// Spin and settle in one step, skipping the animation.
    pub fn draw(&mut self, roster: &[Participant]) -> Result<WinnerRecord, DrawError> {
        self.begin_spin(roster)?;
        self.settle(roster)
    }

    fn take_from_pool(&mut self) -> Option<Participant> {
        if self.remaining.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..self.remaining.len());
        Some(self.remaining.remove(idx))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
