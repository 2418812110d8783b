//! Virtual character display for testing and simulation.
//!
//! The display keeps the current screen plus every screen ever shown, so
//! tests can assert on the exact order of rendered states.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::{HardwareError, Result, traits::DisplayDevice};

/// Default number of lines (16x2 LCD).
const DEFAULT_LINES: usize = 2;

/// Default number of characters per line (16x2 LCD).
const DEFAULT_COLUMNS: usize = 16;

#[derive(Debug, Default)]
struct DisplayState {
    /// Lines currently on screen
    lines: Vec<String>,

    /// Every screen passed to `show`, oldest first
    frames: Vec<Vec<String>>,
}

/// Mock 16x2 character display.
///
/// # Examples
///
/// ```
/// use doorlock_hardware::mock::MockDisplay;
/// use doorlock_hardware::traits::DisplayDevice;
///
/// #[tokio::main]
/// async fn main() -> doorlock_hardware::Result<()> {
///     let (mut display, handle) = MockDisplay::new();
///
///     display.show(&["PLZ Enter Pass:", ""]).await?;
///     display.put_char('*').await?;
///
///     assert_eq!(handle.current(), vec!["PLZ Enter Pass:", "*"]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockDisplay {
    state: Arc<Mutex<DisplayState>>,
    lines: usize,
    columns: usize,
}

impl MockDisplay {
    /// Create a 16x2 display.
    pub fn new() -> (Self, MockDisplayHandle) {
        Self::with_size(DEFAULT_LINES, DEFAULT_COLUMNS)
    }

    /// Create a display of custom size.
    pub fn with_size(lines: usize, columns: usize) -> (Self, MockDisplayHandle) {
        let state = Arc::new(Mutex::new(DisplayState::default()));
        let display = Self {
            state: Arc::clone(&state),
            lines,
            columns,
        };
        (display, MockDisplayHandle { state })
    }

    fn state(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplayDevice for MockDisplay {
    fn columns(&self) -> usize {
        self.columns
    }

    async fn show(&mut self, lines: &[&str]) -> Result<()> {
        if lines.len() > self.lines {
            return Err(HardwareError::invalid_data(format!(
                "Display has {} lines, got {}",
                self.lines,
                lines.len()
            )));
        }
        if let Some(line) = lines.iter().find(|line| line.len() > self.columns) {
            return Err(HardwareError::invalid_data(format!(
                "Line exceeds {} columns: {line:?}",
                self.columns
            )));
        }

        let frame: Vec<String> = lines.iter().map(|line| line.trim_end().to_string()).collect();
        debug!(screen = ?frame, "display");

        let mut state = self.state();
        state.lines = frame.clone();
        state.frames.push(frame);
        Ok(())
    }

    async fn put_char(&mut self, c: char) -> Result<()> {
        let columns = self.columns;
        let mut state = self.state();
        if state.lines.is_empty() {
            state.lines.push(String::new());
        }
        if let Some(line) = state.lines.last_mut() {
            if line.len() < columns {
                line.push(c);
            }
        }
        Ok(())
    }
}

/// Read access to a [`MockDisplay`] from tests.
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    state: Arc<Mutex<DisplayState>>,
}

impl MockDisplayHandle {
    fn state(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lines currently on screen, trailing spaces removed.
    pub fn current(&self) -> Vec<String> {
        self.state().lines.clone()
    }

    /// Every screen shown so far, oldest first.
    pub fn frames(&self) -> Vec<Vec<String>> {
        self.state().frames.clone()
    }

    /// First line of every screen shown so far, trimmed.
    pub fn headlines(&self) -> Vec<String> {
        self.state()
            .frames
            .iter()
            .map(|frame| frame.first().map(|l| l.trim().to_string()).unwrap_or_default())
            .collect()
    }

    /// Whether any screen contained `text` on any line.
    pub fn has_shown(&self, text: &str) -> bool {
        self.state()
            .frames
            .iter()
            .any(|frame| frame.iter().any(|line| line.contains(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_show_records_frames() {
        let (mut display, handle) = MockDisplay::new();

        display.show(&["    Door is", "    Unlocking!"]).await.unwrap();
        display.show(&["Door is Unlock!"]).await.unwrap();

        assert_eq!(handle.frames().len(), 2);
        assert_eq!(handle.headlines(), vec!["Door is", "Door is Unlock!"]);
        assert!(handle.has_shown("Unlocking!"));
        assert!(!handle.has_shown("Locking!"));
    }

    #[tokio::test]
    async fn test_put_char_appends_to_last_line() {
        let (mut display, handle) = MockDisplay::new();

        display.show(&["PLZ Enter Pass:", ""]).await.unwrap();
        for _ in 0..5 {
            display.put_char('*').await.unwrap();
        }

        assert_eq!(handle.current()[1], "*****");
        // Masking characters do not create new frames
        assert_eq!(handle.frames().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_oversized_screen() {
        let (mut display, _handle) = MockDisplay::new();

        assert!(display.show(&["a", "b", "c"]).await.is_err());
        assert!(display.show(&["this line is far too long"]).await.is_err());
    }

    #[tokio::test]
    async fn test_put_char_clips_at_column_limit() {
        let (mut display, handle) = MockDisplay::with_size(1, 4);

        for _ in 0..6 {
            display.put_char('*').await.unwrap();
        }

        assert_eq!(handle.current(), vec!["****"]);
        assert_eq!(display.columns(), 4);
    }
}
