//! ANSI escape sequences for the viewer screen
//!
//! Everything appends to a `String` so a frame is built in memory and
//! written to the terminal in one go.

use chunk_allocator::Status;

/// ANSI color codes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
}

impl Color {
    /// Background used for a status cell
    pub fn for_status(status: Status) -> Self {
        match status {
            Status::Free => Color::Blue,
            Status::TagA => Color::Red,
            Status::TagB => Color::Green,
            Status::TagC => Color::Yellow,
        }
    }
}

/// Screen control functions
pub mod screen {
    /// Clear the entire screen
    pub fn clear(out: &mut String) {
        out.push_str("\x1b[2J");
    }

    /// Save current screen and switch to alternate buffer (like vim/less)
    pub fn enter_alternate(out: &mut String) {
        out.push_str("\x1b[?1049h");
    }

    /// Restore original screen from alternate buffer
    pub fn exit_alternate(out: &mut String) {
        out.push_str("\x1b[?1049l");
    }
}

/// Cursor control functions
pub mod cursor {
    /// Move cursor to home position (1,1)
    pub fn home(out: &mut String) {
        out.push_str("\x1b[H");
    }
}

/// Color and style functions
pub mod style {
    use super::Color;

    /// Set background color
    pub fn bg(out: &mut String, color: Color) {
        out.push_str(&format!("\x1b[{}m", 40 + color as u8));
    }

    /// Reset all styles to default
    pub fn reset(out: &mut String) {
        out.push_str("\x1b[0m");
    }
}
