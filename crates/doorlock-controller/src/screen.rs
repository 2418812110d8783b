//! Interface node screen texts.
//!
//! Every screen is two lines on a 16-column character display. Status
//! screens are centred, prompts are left aligned so the masked input lands
//! right after the prompt text.

use doorlock_core::DoorPhase;

/// Horizontal placement of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    /// Extra space goes to the right when the padding is odd.
    Center,
}

/// A screen the Interface node can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Banner,
    EnterPassword,
    ReEnterPassword,
    OldPassword,
    Unmatched,
    PasswordSet,
    MainMenu,
    WrongPassword,
    Unlocking,
    Unlocked,
    Locking,
    Locked,
    Warning,
}

impl Screen {
    /// Raw text of both lines.
    pub fn lines(self) -> [&'static str; 2] {
        match self {
            Screen::Banner => ["Door Locker", "Security System!"],
            Screen::EnterPassword => ["PLZ Enter Pass:", ""],
            Screen::ReEnterPassword => ["PLZ re-enter the", "same pass:"],
            Screen::OldPassword => ["PLZ enter the", "old pass:"],
            Screen::Unmatched => ["Unmatched Pass", "Try again!!"],
            Screen::PasswordSet => ["New Pass is Set!", ""],
            Screen::MainMenu => ["+ : Open Door", "- : Change Pass"],
            Screen::WrongPassword => ["WRONG PASS!!", ""],
            Screen::Unlocking => ["Door is", "Unlocking!"],
            Screen::Unlocked => ["Door is Unlock!", ""],
            Screen::Locking => ["Door is", "Locking!"],
            Screen::Locked => ["Door is", "Locked!"],
            Screen::Warning => ["!!!Warning!!!", ""],
        }
    }

    /// Whether the screen asks for credential input on its last line.
    pub fn is_prompt(self) -> bool {
        matches!(
            self,
            Screen::EnterPassword | Screen::ReEnterPassword | Screen::OldPassword
        )
    }

    fn alignment(self) -> Alignment {
        if self.is_prompt() || self == Screen::MainMenu {
            Alignment::Left
        } else {
            Alignment::Center
        }
    }

    /// Screen mirroring a door phase.
    pub fn for_phase(phase: DoorPhase) -> Screen {
        match phase {
            DoorPhase::Unlocking => Screen::Unlocking,
            DoorPhase::Held => Screen::Unlocked,
            DoorPhase::Locking => Screen::Locking,
            DoorPhase::Locked => Screen::Locked,
        }
    }

    /// Lines laid out for a display `columns` wide, trailing spaces removed.
    ///
    /// ```
    /// use doorlock_controller::Screen;
    ///
    /// assert_eq!(Screen::Locked.render(16), vec!["    Door is", "    Locked!"]);
    /// assert_eq!(Screen::EnterPassword.render(16), vec!["PLZ Enter Pass:", ""]);
    /// ```
    pub fn render(self, columns: usize) -> Vec<String> {
        let alignment = self.alignment();
        self.lines()
            .iter()
            .map(|line| align_text(line, columns, alignment).trim_end().to_string())
            .collect()
    }
}

/// Truncate text to `max_chars` characters.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Pad `text` with spaces to exactly `width` characters.
///
/// ```
/// use doorlock_controller::screen::{Alignment, align_text};
///
/// assert_eq!(align_text("Locked!", 11, Alignment::Center), "  Locked!  ");
/// assert_eq!(align_text("Locked!", 9, Alignment::Left), "Locked!  ");
/// ```
pub fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let char_count = text.chars().count();
    if char_count >= width {
        return truncate_text(text, width);
    }

    let padding = width - char_count;
    match alignment {
        Alignment::Left => format!("{text}{}", " ".repeat(padding)),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{text}{}", " ".repeat(left_pad), " ".repeat(right_pad))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL: [Screen; 13] = [
        Screen::Banner,
        Screen::EnterPassword,
        Screen::ReEnterPassword,
        Screen::OldPassword,
        Screen::Unmatched,
        Screen::PasswordSet,
        Screen::MainMenu,
        Screen::WrongPassword,
        Screen::Unlocking,
        Screen::Unlocked,
        Screen::Locking,
        Screen::Locked,
        Screen::Warning,
    ];

    #[test]
    fn test_every_screen_fits_lcd() {
        for screen in ALL {
            for line in screen.render(16) {
                assert!(line.chars().count() <= 16, "{screen:?}: {line:?}");
            }
        }
    }

    #[test]
    fn test_prompts_leave_room_for_masked_input() {
        for screen in ALL.into_iter().filter(|s| s.is_prompt()) {
            let last = screen.render(16).pop().unwrap_or_default();
            assert!(last.len() + 5 <= 16, "{screen:?}");
        }
    }

    #[rstest]
    #[case(DoorPhase::Unlocking, "Unlocking!")]
    #[case(DoorPhase::Held, "Door is Unlock!")]
    #[case(DoorPhase::Locking, "Locking!")]
    #[case(DoorPhase::Locked, "Locked!")]
    fn test_phase_screens(#[case] phase: DoorPhase, #[case] text: &str) {
        assert!(Screen::for_phase(phase).lines().contains(&text));
    }

    #[rstest]
    #[case("HELLO", 10, Alignment::Left, "HELLO     ")]
    #[case("HELLO", 10, Alignment::Center, "  HELLO   ")]
    #[case("TOO LONG FOR IT", 8, Alignment::Center, "TOO LONG")]
    fn test_align_text(
        #[case] text: &str,
        #[case] width: usize,
        #[case] alignment: Alignment,
        #[case] expected: &str,
    ) {
        assert_eq!(align_text(text, width, alignment), expected);
    }
}
