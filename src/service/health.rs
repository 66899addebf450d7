//! Per-component health tracking.
//!
//! Each periodic component owns a `ComponentHealth` and reports every tick's result
//! to it. Transitions are logged once, so a component that stays degraded for an
//! hour produces one warning instead of sixty.

use std::fmt::Display;

/// Lifecycle phase of a periodic component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No tick has succeeded yet.
    Uninitialized,
    /// The last tick succeeded.
    Active,
    /// The last tick failed; the next tick retries.
    Degraded,
}

/// A change of `Phase` caused by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Initialized,
    Degraded,
    Recovered,
}

/// Result of one tick of a periodic component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Whether anything was sent to Discord.
    pub pushed: bool,
    pub transition: Option<Transition>,
}

impl TickOutcome {
    pub fn pushed(transition: Option<Transition>) -> Self {
        Self {
            pushed: true,
            transition,
        }
    }

    pub fn skipped(transition: Option<Transition>) -> Self {
        Self {
            pushed: false,
            transition,
        }
    }
}

/// Tracks the phase of one component and logs its transitions.
#[derive(Debug)]
pub struct ComponentHealth {
    component: &'static str,
    phase: Phase,
}

impl ComponentHealth {
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            phase: Phase::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Records a successful tick.
    pub fn succeeded(&mut self) -> Option<Transition> {
        let transition = match self.phase {
            Phase::Active => None,
            Phase::Uninitialized => {
                tracing::info!("{} is active", self.component);
                Some(Transition::Initialized)
            }
            Phase::Degraded => {
                tracing::info!("{} recovered", self.component);
                Some(Transition::Recovered)
            }
        };

        self.phase = Phase::Active;
        transition
    }

    /// Records a failed tick.
    pub fn failed(&mut self, reason: &dyn Display) -> Option<Transition> {
        if self.phase == Phase::Degraded {
            tracing::debug!("{} still degraded: {}", self.component, reason);
            return None;
        }

        tracing::warn!("{} degraded: {}", self.component, reason);
        self.phase = Phase::Degraded;
        Some(Transition::Degraded)
    }
}
