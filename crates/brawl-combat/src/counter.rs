//! Frame-windowed counters and parries.
//!
//! Each fighter has two independent windows. A window opens on request, then
//! either succeeds (closing it) or expires once the frame counter passes its
//! end. Absent and expired windows always fail.
//!
//! A parry reflects the incoming hit back onto the attacker. A counter only
//! scales damage. Parrying on the exact first frame of the window opens a
//! bonus counter window shortly after.

use brawl_common::FighterId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::config::CounterConfig;

/// An inclusive `[start_frame, end_frame]` span.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DefenseWindow {
    /// Whether the window is open
    pub active: bool,
    /// First frame of the window
    pub start_frame: u64,
    /// Last frame of the window
    pub end_frame: u64,
    /// Damage scalar on success
    pub multiplier: f32,
}

impl DefenseWindow {
    fn open(start_frame: u64, length: u64, multiplier: f32) -> Self {
        Self {
            active: true,
            start_frame,
            end_frame: start_frame + length,
            multiplier,
        }
    }

    /// Resolves a hit on `frame`, closing the window on success or expiry.
    fn resolve(&mut self, frame: u64) -> bool {
        if !self.active {
            return false;
        }
        if frame > self.end_frame {
            self.active = false;
            return false;
        }
        if frame < self.start_frame {
            return false;
        }
        self.active = false;
        true
    }
}

/// Counter window of a fighter.
pub type CounterWindow = DefenseWindow;

/// Parry window of a fighter.
pub type ParryWindow = DefenseWindow;

/// Both windows of one fighter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DefenseWindows {
    /// Counter window
    pub counter: CounterWindow,
    /// Parry window
    pub parry: ParryWindow,
}

/// Result of a parry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParryCheck {
    /// No parry.
    Missed,
    /// Parried inside the window.
    Parried,
    /// Parried on the window's first frame.
    Perfect,
}

impl ParryCheck {
    /// Whether the hit was parried.
    #[must_use]
    pub fn succeeded(self) -> bool {
        !matches!(self, Self::Missed)
    }
}

/// Tracks counter and parry windows per fighter.
#[derive(Debug, Default)]
pub struct CounterSystem {
    config: CounterConfig,
    windows: HashMap<FighterId, DefenseWindows>,
}

impl CounterSystem {
    /// Creates a counter system.
    #[must_use]
    pub fn new(config: CounterConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
        }
    }

    /// Opens `[frame, frame + counter_frames]`, replacing any open counter window.
    pub fn start_counter_window(&mut self, fighter: FighterId, frame: u64) {
        let window = CounterWindow::open(
            frame,
            self.config.counter_frames,
            self.config.counter_multiplier,
        );
        self.windows.entry(fighter).or_default().counter = window;
        trace!(%fighter, frame, "counter window opened");
    }

    /// Opens `[frame, frame + parry_frames]`, replacing any open parry window.
    pub fn start_parry_window(&mut self, fighter: FighterId, frame: u64) {
        let window = ParryWindow::open(
            frame,
            self.config.parry_frames,
            self.config.parry_multiplier,
        );
        self.windows.entry(fighter).or_default().parry = window;
        trace!(%fighter, frame, "parry window opened");
    }

    /// Closes a fighter's counter window.
    pub fn end_counter_window(&mut self, fighter: FighterId) {
        if let Some(windows) = self.windows.get_mut(&fighter) {
            windows.counter.active = false;
        }
    }

    /// Closes a fighter's parry window.
    pub fn end_parry_window(&mut self, fighter: FighterId) {
        if let Some(windows) = self.windows.get_mut(&fighter) {
            windows.parry.active = false;
        }
    }

    /// Checks whether a hit on `frame` is parried by `fighter`.
    pub fn check_parry(&mut self, fighter: FighterId, frame: u64) -> ParryCheck {
        let Some(windows) = self.windows.get_mut(&fighter) else {
            return ParryCheck::Missed;
        };
        let start = windows.parry.start_frame;
        if !windows.parry.resolve(frame) {
            return ParryCheck::Missed;
        }
        if frame == start {
            let bonus_start = frame + self.config.perfect_parry_bonus_frames;
            self.start_counter_window(fighter, bonus_start);
            debug!(%fighter, frame, bonus_start, "perfect parry");
            ParryCheck::Perfect
        } else {
            debug!(%fighter, frame, "parry");
            ParryCheck::Parried
        }
    }

    /// Checks whether a hit on `frame` falls in `fighter`'s counter window.
    pub fn check_counter(&mut self, fighter: FighterId, frame: u64) -> bool {
        let Some(windows) = self.windows.get_mut(&fighter) else {
            return false;
        };
        let countered = windows.counter.resolve(frame);
        if countered {
            debug!(%fighter, frame, "counter");
        }
        countered
    }

    /// Closes every window whose end has passed.
    pub fn update(&mut self, frame: u64) {
        for (fighter, windows) in &mut self.windows {
            for window in [&mut windows.counter, &mut windows.parry] {
                if window.active && frame > window.end_frame {
                    window.active = false;
                    trace!(%fighter, frame, "window expired");
                }
            }
        }
    }

    /// Snapshot of a fighter's windows.
    #[must_use]
    pub fn get_windows(&self, fighter: FighterId) -> Option<DefenseWindows> {
        self.windows.get(&fighter).copied()
    }

    /// Forgets one fighter.
    pub fn remove(&mut self, fighter: FighterId) {
        self.windows.remove(&fighter);
    }

    /// Forgets every fighter.
    pub fn clear(&mut self) {
        self.windows.clear();
    }
}
