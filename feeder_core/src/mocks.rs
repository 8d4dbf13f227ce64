//! Test and helper doubles for feeder_core.
//!
//! Everything here is deterministic: `StepClock` only advances when slept on,
//! so the timing loops can be exercised without a single real sleep.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use feeder_traits::{Clock, Indicator, MotorOutput, OptoSensor, TensionSwitch};

/// Deterministic clock: `now()` is an origin plus an offset that grows only
/// through `sleep()` or an explicit `advance()`.
#[derive(Debug, Clone)]
pub struct StepClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StepClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance virtual time by `d`.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    /// Total virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

/// Optical sensor replaying a fixed sequence, then repeating the last value.
pub struct ScriptedOpto {
    seq: Vec<u16>,
    idx: usize,
}

impl ScriptedOpto {
    pub fn new(seq: impl Into<Vec<u16>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
        }
    }
}

impl OptoSensor for ScriptedOpto {
    fn read(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let v = if self.idx < self.seq.len() {
            let x = self.seq[self.idx];
            self.idx += 1;
            x
        } else {
            self.seq.last().copied().unwrap_or(0)
        };
        Ok(v)
    }
}

/// Tension switch replaying a fixed poll script, then repeating the last
/// value.
pub struct ScriptedSwitch {
    seq: Vec<bool>,
    idx: usize,
}

impl ScriptedSwitch {
    pub fn from_script(seq: impl Into<Vec<bool>>) -> Self {
        Self {
            seq: seq.into(),
            idx: 0,
        }
    }

    /// Reads not-tensioned for `polls` polls, then taut forever.
    pub fn trips_after(polls: usize) -> Self {
        let mut seq = vec![false; polls];
        seq.push(true);
        Self::from_script(seq)
    }

    pub fn never_trips() -> Self {
        Self::from_script([false])
    }
}

impl TensionSwitch for ScriptedSwitch {
    fn is_tensioned(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let v = if self.idx < self.seq.len() {
            let x = self.seq[self.idx];
            self.idx += 1;
            x
        } else {
            self.seq.last().copied().unwrap_or(false)
        };
        Ok(v)
    }
}

/// Motor output that records every commanded level through a shared handle,
/// so assertions survive the feeder taking ownership of the line.
pub struct RecordingMotor {
    log: Rc<RefCell<Vec<u8>>>,
}

impl Default for RecordingMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingMotor {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Shared view of every level written so far.
    pub fn log(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.log)
    }
}

impl MotorOutput for RecordingMotor {
    fn set_level(&mut self, level: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.borrow_mut().push(level);
        Ok(())
    }
}

/// Count of nonzero levels in a recording motor log: the drive pulses issued.
pub fn pulses(log: &Rc<RefCell<Vec<u8>>>) -> usize {
    log.borrow().iter().filter(|&&level| level > 0).count()
}

/// Last commanded level in a recording motor log (0 if never driven).
pub fn last_level(log: &Rc<RefCell<Vec<u8>>>) -> u8 {
    log.borrow().last().copied().unwrap_or(0)
}

/// Indicator that records every state change through a shared handle.
pub struct RecordingIndicator {
    log: Rc<RefCell<Vec<bool>>>,
}

impl Default for RecordingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn log(&self) -> Rc<RefCell<Vec<bool>>> {
        Rc::clone(&self.log)
    }
}

impl Indicator for RecordingIndicator {
    fn set_active(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.borrow_mut().push(on);
        Ok(())
    }
}

/// Motor output that fails on every write; drives the line-fault paths.
pub struct FailingMotor;

impl MotorOutput for FailingMotor {
    fn set_level(&mut self, _level: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("motor line open")))
    }
}
