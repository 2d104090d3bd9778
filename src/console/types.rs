//! Value types shared by the console service and its backends.

use std::fmt;

use crate::error::{ErrorKind, NativeError, Result};

/// A file descriptor that may be attached to a console.
///
/// The service never opens, closes or duplicates the descriptor it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Descriptor(i32);

impl Descriptor {
    pub const STDIN: Descriptor = Descriptor(0);
    pub const STDOUT: Descriptor = Descriptor(1);
    pub const STDERR: Descriptor = Descriptor(2);

    pub const fn new(fd: i32) -> Self {
        Self(fd)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }

    /// Fails with invalid-handle for descriptors that can never be open.
    pub fn validate(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(NativeError::new(
                ErrorKind::InvalidHandle,
                format!("invalid file descriptor {}", self.0),
            ))
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Descriptor::STDIN => f.write_str("stdin"),
            Descriptor::STDOUT => f.write_str("stdout"),
            Descriptor::STDERR => f.write_str("stderr"),
            Descriptor(fd) => write!(f, "fd {}", fd),
        }
    }
}

/// Kind of console a descriptor is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleType {
    /// Not a console.
    None,
    /// The platform's own console (Windows console, POSIX tty).
    Native,
    /// A pty-style emulation layer, such as the Cygwin or MSYS pipes on Windows.
    Emulated,
}

impl ConsoleType {
    /// Numeric code used at the backend boundary.
    pub const fn code(self) -> i32 {
        match self {
            ConsoleType::None => 0,
            ConsoleType::Native => 1,
            ConsoleType::Emulated => 2,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ConsoleType::None),
            1 => Some(ConsoleType::Native),
            2 => Some(ConsoleType::Emulated),
            _ => None,
        }
    }

    pub const fn is_console(self) -> bool {
        !matches!(self, ConsoleType::None)
    }
}

/// Viewport size of a console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

impl TerminalSize {
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

/// Output structure the backend fills in for a size query.
#[derive(Debug, Default)]
pub struct MutableTerminalSize {
    pub cols: u16,
    pub rows: u16,
}

impl MutableTerminalSize {
    pub fn set(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    pub fn freeze(&self) -> TerminalSize {
        TerminalSize::new(self.cols, self.rows)
    }
}

/// The fixed 16 entry ANSI palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl AnsiColor {
    const ALL: [AnsiColor; 16] = [
        AnsiColor::Black,
        AnsiColor::Red,
        AnsiColor::Green,
        AnsiColor::Yellow,
        AnsiColor::Blue,
        AnsiColor::Magenta,
        AnsiColor::Cyan,
        AnsiColor::White,
        AnsiColor::BrightBlack,
        AnsiColor::BrightRed,
        AnsiColor::BrightGreen,
        AnsiColor::BrightYellow,
        AnsiColor::BrightBlue,
        AnsiColor::BrightMagenta,
        AnsiColor::BrightCyan,
        AnsiColor::BrightWhite,
    ];

    /// Palette index, 0-7 for normal colors and 8-15 for bright ones.
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn is_bright(self) -> bool {
        self.index() >= 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_type_codes() {
        assert_eq!(ConsoleType::None.code(), 0);
        assert_eq!(ConsoleType::Native.code(), 1);
        assert_eq!(ConsoleType::Emulated.code(), 2);
        assert_eq!(ConsoleType::from_code(2), Some(ConsoleType::Emulated));
        assert_eq!(ConsoleType::from_code(3), None);
        assert_eq!(ConsoleType::from_code(-1), None);
        assert!(!ConsoleType::None.is_console());
        assert!(ConsoleType::Emulated.is_console());
    }

    #[test]
    fn test_descriptor_validation() {
        assert!(Descriptor::STDERR.validate().is_ok());
        let err = Descriptor::new(-1).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
        assert_eq!(Descriptor::STDOUT.to_string(), "stdout");
        assert_eq!(Descriptor::new(7).to_string(), "fd 7");
    }

    #[test]
    fn test_palette_indices() {
        assert_eq!(AnsiColor::Black.index(), 0);
        assert_eq!(AnsiColor::White.index(), 7);
        assert_eq!(AnsiColor::BrightWhite.index(), 15);
        assert_eq!(AnsiColor::from_index(9), Some(AnsiColor::BrightRed));
        assert_eq!(AnsiColor::from_index(16), None);
        assert!(AnsiColor::BrightBlack.is_bright());
        assert!(!AnsiColor::Cyan.is_bright());
    }
}
