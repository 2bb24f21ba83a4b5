//! gpioctrl-dummy - In-memory GPIO line emulator for testing
//!
//! This crate provides a line provider that emulates a GPIO chip in
//! memory. Every request, level change and release is recorded, so tests
//! (and the CLI without hardware) can observe exactly what the device did
//! to its lines.

use std::sync::{Arc, Mutex, MutexGuard};

use gpioctrl_core::error::{Error, Result};
use gpioctrl_core::lines::{Level, LineProvider, OutputLine};

/// Configuration for the dummy chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Number of lines on the emulated chip
    pub num_lines: u32,
    /// Offsets that refuse to be requested
    pub unavailable: Vec<u32>,
    /// Offsets that reject level changes
    pub fail_writes: Vec<u32>,
    /// Offset at which the chip "disappears", failing the load
    pub fatal_at: Option<u32>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            num_lines: 54, // BCM2711 main GPIO bank
            unavailable: Vec::new(),
            fail_writes: Vec::new(),
            fatal_at: None,
        }
    }
}

/// Something that happened to a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// Line requested as output, driven low
    Requested {
        /// Hardware offset
        offset: u32,
    },
    /// Line driven to a level
    Set {
        /// Hardware offset
        offset: u32,
        /// New level
        level: Level,
    },
    /// Line released; `level` is what it showed right before release
    Released {
        /// Hardware offset
        offset: u32,
        /// Level at release
        level: Level,
    },
}

#[derive(Debug)]
struct ChipState {
    levels: Vec<Option<Level>>,
    set_counts: Vec<usize>,
    events: Vec<LineEvent>,
}

/// Dummy GPIO chip
///
/// Cloning yields another handle to the same emulated chip.
#[derive(Debug, Clone)]
pub struct DummyChip {
    config: Arc<DummyConfig>,
    state: Arc<Mutex<ChipState>>,
}

impl DummyChip {
    /// Create a new dummy chip with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let n = config.num_lines as usize;
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(ChipState {
                levels: vec![None; n],
                set_counts: vec![0; n],
                events: Vec::new(),
            })),
        }
    }

    /// Create a new dummy chip with default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, ChipState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Level of a requested line, `None` if not requested
    pub fn level(&self, offset: u32) -> Option<Level> {
        self.lock().levels.get(offset as usize).copied().flatten()
    }

    /// Whether a line is currently requested
    pub fn is_requested(&self, offset: u32) -> bool {
        self.level(offset).is_some()
    }

    /// Number of level changes applied to a line since the chip was created
    pub fn set_count(&self, offset: u32) -> usize {
        self.lock()
            .set_counts
            .get(offset as usize)
            .copied()
            .unwrap_or(0)
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> Vec<LineEvent> {
        self.lock().events.clone()
    }
}

impl LineProvider for DummyChip {
    type Line = DummyLine;

    fn name(&self) -> &str {
        "dummy"
    }

    fn acquire_output(&mut self, offset: u32) -> Result<DummyLine> {
        if self.config.fatal_at == Some(offset) {
            return Err(Error::Backend(format!(
                "dummy chip vanished while requesting line {}",
                offset
            )));
        }
        if self.config.unavailable.contains(&offset) {
            return Err(Error::LineRequestFailed { offset });
        }

        let mut state = self.lock();
        // Out of range, or already requested by someone else
        if !matches!(state.levels.get(offset as usize), Some(None)) {
            return Err(Error::LineRequestFailed { offset });
        }
        state.levels[offset as usize] = Some(Level::Low);
        state.events.push(LineEvent::Requested { offset });
        log::trace!("dummy: line {} requested", offset);
        drop(state);

        Ok(DummyLine {
            chip: self.clone(),
            offset,
        })
    }
}

/// A requested dummy line
pub struct DummyLine {
    chip: DummyChip,
    offset: u32,
}

impl OutputLine for DummyLine {
    fn set_level(&mut self, level: Level) -> Result<()> {
        if self.chip.config.fail_writes.contains(&self.offset) {
            return Err(Error::LineWriteFailed {
                offset: self.offset,
            });
        }

        let offset = self.offset;
        let mut state = self.chip.lock();
        state.levels[offset as usize] = Some(level);
        state.set_counts[offset as usize] += 1;
        state.events.push(LineEvent::Set { offset, level });
        Ok(())
    }
}

impl Drop for DummyLine {
    fn drop(&mut self) {
        let offset = self.offset;
        let mut state = self.chip.lock();
        if let Some(level) = state.levels[offset as usize].take() {
            state.events.push(LineEvent::Released { offset, level });
        }
    }
}
