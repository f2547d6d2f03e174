//! services/app/src/listening.rs
//!
//! A simulated voice-to-notes recording flow, unrelated to the capture
//! pipeline. Nothing is recorded and nothing reaches the backend; the state
//! machine only animates listening and a fake conversion progress bar.

/// How many ticks the simulated listening period lasts.
const LISTEN_TICKS: u32 = 15;
/// Progress gained per conversion tick.
const PROGRESS_STEP: f32 = 0.1;

/// Where the simulation currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListeningPhase {
    Idle,
    Listening { remaining_ticks: u32 },
    Converting { progress: f32 },
}

/// Tick-driven so a timer can animate it and tests can step it directly.
pub struct ListeningSimulation {
    phase: ListeningPhase,
}

impl Default for ListeningSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl ListeningSimulation {
    pub fn new() -> Self {
        Self {
            phase: ListeningPhase::Idle,
        }
    }

    pub fn phase(&self) -> ListeningPhase {
        self.phase
    }

    /// Starts listening. Pressing the mic while already busy does nothing.
    pub fn start(&mut self) -> bool {
        if self.phase != ListeningPhase::Idle {
            return false;
        }
        self.phase = ListeningPhase::Listening {
            remaining_ticks: LISTEN_TICKS,
        };
        true
    }

    /// Advances the simulation by one timer tick.
    pub fn tick(&mut self) -> ListeningPhase {
        self.phase = match self.phase {
            ListeningPhase::Idle => ListeningPhase::Idle,
            ListeningPhase::Listening { remaining_ticks } => {
                if remaining_ticks > 1 {
                    ListeningPhase::Listening {
                        remaining_ticks: remaining_ticks - 1,
                    }
                } else {
                    ListeningPhase::Converting { progress: 0.0 }
                }
            }
            ListeningPhase::Converting { progress } => {
                let next = progress + PROGRESS_STEP;
                if next >= 1.0 {
                    ListeningPhase::Idle
                } else {
                    ListeningPhase::Converting { progress: next }
                }
            }
        };
        self.phase
    }

    /// The status line the screen shows for the current phase.
    pub fn status_line(&self) -> &'static str {
        match self.phase {
            ListeningPhase::Idle => "Tap the mic to start",
            ListeningPhase::Listening { .. } => "Let me listen ...",
            ListeningPhase::Converting { .. } => "Converting to notes...",
        }
    }
}
