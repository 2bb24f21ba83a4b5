//! GPIO line table and hardware line traits
//!
//! Backends implement [`LineProvider`] to hand out [`OutputLine`] handles.
//! The [`LineTable`] binds each logical pin index to an optional handle,
//! probing hardware offsets sequentially at load time and releasing them
//! in reverse order at unload.

use crate::error::{Error, Result};

/// Output level of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Driven low (inactive)
    Low,
    /// Driven high (active)
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl core::fmt::Display for Level {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

/// An exclusively owned hardware line configured as output
///
/// Dropping the handle releases the line.
pub trait OutputLine {
    /// Drive the line to `level`
    fn set_level(&mut self, level: Level) -> Result<()>;
}

/// Source of hardware line handles
pub trait LineProvider {
    /// Handle type handed out by this provider
    type Line: OutputLine;

    /// Short backend name for diagnostics
    fn name(&self) -> &str;

    /// Request the line at hardware `offset` as an output driven low
    ///
    /// Soft errors (see [`Error::is_soft`]) leave the binding empty.
    /// Anything else aborts the load.
    fn acquire_output(&mut self, offset: u32) -> Result<Self::Line>;
}

/// Type-erased line handle
pub type DynLine = Box<dyn OutputLine + Send>;

impl OutputLine for DynLine {
    fn set_level(&mut self, level: Level) -> Result<()> {
        (**self).set_level(level)
    }
}

/// Adapts a provider so that it hands out [`DynLine`]s
pub struct BoxedLines<P>(pub P);

impl<P> LineProvider for BoxedLines<P>
where
    P: LineProvider,
    P::Line: Send + 'static,
{
    type Line = DynLine;

    fn name(&self) -> &str {
        self.0.name()
    }

    fn acquire_output(&mut self, offset: u32) -> Result<DynLine> {
        let line = self.0.acquire_output(offset)?;
        Ok(Box::new(line))
    }
}

/// Diagnostic view of one binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Logical pin index
    pub index: u32,
    /// Hardware offset the index maps to
    pub offset: u32,
    /// Whether a hardware handle is held
    pub bound: bool,
}

/// Mapping from logical pin index to optional hardware handle
pub struct LineTable<L: OutputLine> {
    base_offset: u32,
    lines: Vec<Option<L>>,
}

impl<L: OutputLine> LineTable<L> {
    /// Probe `max_index + 1` lines starting at `base_offset`
    ///
    /// A line that cannot be acquired gets a null binding and probing
    /// continues. A fatal provider error releases everything acquired so
    /// far, newest first, before it is returned.
    pub fn probe<P>(provider: &mut P, base_offset: u32, max_index: u32) -> Result<Self>
    where
        P: LineProvider<Line = L>,
    {
        let mut table = Self {
            base_offset,
            lines: Vec::with_capacity(max_index as usize + 1),
        };

        for index in 0..=max_index {
            let offset = base_offset + index;
            match provider.acquire_output(offset) {
                Ok(line) => {
                    log::info!("GPIO {} set as output", index);
                    table.lines.push(Some(line));
                }
                Err(e) if e.is_soft() => {
                    log::warn!("Error setting GPIO {} as output: {}", index, e);
                    table.lines.push(None);
                }
                Err(e) => {
                    log::error!(
                        "{}: probing GPIO {} failed, releasing {} acquired line(s): {}",
                        provider.name(),
                        index,
                        table.bound_count(),
                        e
                    );
                    table.teardown();
                    return Err(e);
                }
            }
        }

        Ok(table)
    }

    /// Highest valid logical index
    pub fn max_index(&self) -> u32 {
        self.lines.len().saturating_sub(1) as u32
    }

    /// Number of logical indices, bound or not
    ///
    /// Never zero: index 0 always exists.
    pub fn pin_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of indices holding a hardware handle
    pub fn bound_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_some()).count()
    }

    /// Snapshot of every binding
    pub fn bindings(&self) -> Vec<Binding> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| Binding {
                index: i as u32,
                offset: self.base_offset + i as u32,
                bound: line.is_some(),
            })
            .collect()
    }

    /// Drive the line at `index` to `level`
    ///
    /// Out-of-range indices fail with `PinOutOfRange`. A null binding
    /// fails with the soft `LineUnavailable`.
    pub fn set_line(&mut self, index: i32, level: Level) -> Result<()> {
        let max = self.max_index();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| self.lines.get_mut(i))
            .ok_or(Error::PinOutOfRange { index, max })?;

        match slot {
            Some(line) => line.set_level(level),
            None => Err(Error::LineUnavailable {
                index: index as u32,
            }),
        }
    }

    /// Force every bound line low and release it, highest index first
    ///
    /// Safe to call more than once; released bindings are cleared.
    pub fn teardown(&mut self) {
        for (index, slot) in self.lines.iter_mut().enumerate().rev() {
            if let Some(mut line) = slot.take() {
                if let Err(e) = line.set_level(Level::Low) {
                    log::error!("Failed to drive GPIO {} low before release: {}", index, e);
                }
                drop(line);
                log::debug!("GPIO {} released", index);
            }
        }
    }
}

impl<L: OutputLine> Drop for LineTable<L> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Minimal provider for unit tests

    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Set(u32, Level),
        Released(u32),
    }

    pub struct FakeLine {
        offset: u32,
        log: Rc<RefCell<Vec<Event>>>,
    }

    impl OutputLine for FakeLine {
        fn set_level(&mut self, level: Level) -> Result<()> {
            self.log.borrow_mut().push(Event::Set(self.offset, level));
            Ok(())
        }
    }

    impl Drop for FakeLine {
        fn drop(&mut self) {
            self.log.borrow_mut().push(Event::Released(self.offset));
        }
    }

    #[derive(Default)]
    pub struct FakeProvider {
        pub missing: Vec<u32>,
        pub fatal_at: Option<u32>,
        pub log: Rc<RefCell<Vec<Event>>>,
    }

    impl LineProvider for FakeProvider {
        type Line = FakeLine;

        fn name(&self) -> &str {
            "fake"
        }

        fn acquire_output(&mut self, offset: u32) -> Result<FakeLine> {
            if self.fatal_at == Some(offset) {
                return Err(Error::Backend("chip vanished".into()));
            }
            if self.missing.contains(&offset) {
                return Err(Error::LineRequestFailed { offset });
            }
            Ok(FakeLine {
                offset,
                log: Rc::clone(&self.log),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{Event, FakeProvider};
    use super::*;

    #[test]
    fn test_probe_tolerates_missing_lines() {
        let mut provider = FakeProvider {
            missing: vec![2],
            ..Default::default()
        };
        let table = LineTable::probe(&mut provider, 0, 3).unwrap();
        assert_eq!(table.pin_count(), 4);
        assert_eq!(table.bound_count(), 3);
        let bound: Vec<bool> = table.bindings().iter().map(|b| b.bound).collect();
        assert_eq!(bound, vec![true, true, false, true]);
    }

    #[test]
    fn test_set_line_bounds() {
        let mut provider = FakeProvider::default();
        let mut table = LineTable::probe(&mut provider, 0, 27).unwrap();
        assert!(table.set_line(27, Level::High).is_ok());
        assert_eq!(
            table.set_line(28, Level::High),
            Err(Error::PinOutOfRange { index: 28, max: 27 })
        );
        assert_eq!(
            table.set_line(-1, Level::High),
            Err(Error::PinOutOfRange { index: -1, max: 27 })
        );
    }

    #[test]
    fn test_set_line_unbound_is_soft() {
        let mut provider = FakeProvider {
            missing: vec![1],
            ..Default::default()
        };
        let mut table = LineTable::probe(&mut provider, 0, 2).unwrap();
        let err = table.set_line(1, Level::High).unwrap_err();
        assert!(err.is_soft());
        assert!(provider.log.borrow().is_empty());
    }

    #[test]
    fn test_base_offset_mapping() {
        let mut provider = FakeProvider::default();
        let mut table = LineTable::probe(&mut provider, 512, 1).unwrap();
        table.set_line(1, Level::High).unwrap();
        assert_eq!(provider.log.borrow()[0], Event::Set(513, Level::High));
        assert_eq!(table.bindings()[1].offset, 513);
    }

    #[test]
    fn test_teardown_reverse_order_low_before_release() {
        let mut provider = FakeProvider::default();
        let mut table = LineTable::probe(&mut provider, 0, 1).unwrap();
        table.teardown();
        assert_eq!(
            *provider.log.borrow(),
            vec![
                Event::Set(1, Level::Low),
                Event::Released(1),
                Event::Set(0, Level::Low),
                Event::Released(0),
            ]
        );
        assert_eq!(table.bound_count(), 0);

        // Second teardown is a no-op
        table.teardown();
        assert_eq!(provider.log.borrow().len(), 4);
    }

    #[test]
    fn test_fatal_probe_unwinds() {
        let mut provider = FakeProvider {
            fatal_at: Some(2),
            ..Default::default()
        };
        let result = LineTable::probe(&mut provider, 0, 5);
        assert!(matches!(result, Err(Error::Backend(_))));
        assert_eq!(
            *provider.log.borrow(),
            vec![
                Event::Set(1, Level::Low),
                Event::Released(1),
                Event::Set(0, Level::Low),
                Event::Released(0),
            ]
        );
    }
}
