//! Terminal stand-ins for the Interface node's keypad and display.

use std::io::Write;

use doorlock_hardware::mock::MockKeypadHandle;
use doorlock_hardware::{DisplayDevice, HardwareError, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

const LINES: usize = 2;
const COLUMNS: usize = 16;

/// Translate one line of terminal input into keypad codes.
///
/// Digits become the keypad's numeric codes (`'7'` is code 7), whitespace and
/// non-ASCII characters are skipped and every other character is sent as its
/// ASCII value, so `=` confirms and `+`/`-` select menu entries.
pub fn parse_keys(line: &str) -> Vec<u8> {
    line.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_whitespace())
        .filter_map(|c| match c.to_digit(10) {
            Some(digit) => u8::try_from(digit).ok(),
            None => u8::try_from(u32::from(c)).ok(),
        })
        .collect()
}

/// Feed stdin lines into a mock keypad until end of input.
///
/// Dropping the handle at end of input disconnects the keypad, which ends
/// the Interface node's loop.
pub fn spawn_stdin_keys(keys: MockKeypadHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let codes = parse_keys(&line);
            debug!(count = codes.len(), "keys from stdin");
            if keys.send_codes(&codes).await.is_err() {
                break;
            }
        }
    })
}

/// 16x2 character display rendered on stdout.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    lines: Vec<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn print_line(line: &str) {
        println!("| {line:<COLUMNS$} |");
    }

    fn print_frame(&self) {
        let border = format!("+{}+", "-".repeat(COLUMNS + 2));
        println!("{border}");
        for row in 0..LINES {
            Self::print_line(self.lines.get(row).map_or("", String::as_str));
        }
        println!("{border}");
        let _ = std::io::stdout().flush();
    }
}

impl DisplayDevice for ConsoleDisplay {
    fn columns(&self) -> usize {
        COLUMNS
    }

    async fn show(&mut self, lines: &[&str]) -> Result<()> {
        if lines.len() > LINES {
            return Err(HardwareError::invalid_data(format!(
                "Display has {LINES} lines, got {}",
                lines.len()
            )));
        }
        self.lines = lines.iter().map(|line| line.trim_end().to_string()).collect();
        self.print_frame();
        Ok(())
    }

    async fn put_char(&mut self, c: char) -> Result<()> {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if let Some(line) = self.lines.last_mut() {
            if line.chars().count() < COLUMNS {
                line.push(c);
            }
            Self::print_line(line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys_maps_digits_to_keypad_codes() {
        assert_eq!(parse_keys("12345="), vec![1, 2, 3, 4, 5, b'=']);
    }

    #[test]
    fn test_parse_keys_skips_whitespace() {
        assert_eq!(parse_keys(" + "), vec![b'+']);
        assert!(parse_keys("   ").is_empty());
    }

    #[test]
    fn test_parse_keys_drops_non_ascii() {
        assert_eq!(parse_keys("1é2"), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_console_display_masks_on_last_line() {
        let mut display = ConsoleDisplay::new();
        display.show(&["PLZ Enter Pass:", ""]).await.unwrap();
        display.put_char('*').await.unwrap();

        assert_eq!(display.lines, vec!["PLZ Enter Pass:", "*"]);
        assert!(display.show(&["a", "b", "c"]).await.is_err());
    }
}
