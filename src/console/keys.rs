//! Key event translation for raw console input.
//!
//! Turns crossterm key events into the characters a raw-mode reader would see on a
//! terminal. Cursor and editing keys become their xterm escape sequences; function keys
//! are not translated.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const ESC: char = '\u{1b}';
const DEL: char = '\u{7f}';

/// What a single key event contributes to the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    /// Characters to deliver, in order.
    Chars(Vec<char>),
    /// Ctrl-C or Ctrl-D: the reader should stop.
    End,
    /// Nothing to deliver for this event.
    Ignored,
}

fn csi(rest: &str) -> Vec<char> {
    let mut chars = vec![ESC, '['];
    chars.extend(rest.chars());
    chars
}

pub struct KeyTranslator;

impl KeyTranslator {
    pub fn translate(event: &KeyEvent) -> KeyInput {
        if event.kind == KeyEventKind::Release {
            return KeyInput::Ignored;
        }
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);
        let mods = event.modifiers;

        match event.code {
            KeyCode::Char(ch) if ctrl && !alt && matches!(ch.to_ascii_lowercase(), 'c' | 'd') => KeyInput::End,
            KeyCode::Char(ch) => KeyInput::Chars(Self::map_char(ch, ctrl, alt)),
            KeyCode::Enter => KeyInput::Chars(vec!['\r']),
            KeyCode::Tab if mods.contains(KeyModifiers::SHIFT) => KeyInput::Chars(csi("Z")),
            KeyCode::Tab => KeyInput::Chars(vec!['\t']),
            KeyCode::BackTab => KeyInput::Chars(csi("Z")),
            KeyCode::Backspace if alt => KeyInput::Chars(vec![ESC, DEL]),
            KeyCode::Backspace => KeyInput::Chars(vec![DEL]),
            KeyCode::Esc => KeyInput::Chars(vec![ESC]),

            KeyCode::Up => KeyInput::Chars(Self::cursor_key('A', mods)),
            KeyCode::Down => KeyInput::Chars(Self::cursor_key('B', mods)),
            KeyCode::Right => KeyInput::Chars(Self::cursor_key('C', mods)),
            KeyCode::Left => KeyInput::Chars(Self::cursor_key('D', mods)),
            KeyCode::Home => KeyInput::Chars(Self::cursor_key('H', mods)),
            KeyCode::End => KeyInput::Chars(Self::cursor_key('F', mods)),
            KeyCode::Insert => KeyInput::Chars(Self::tilde_key(2, mods)),
            KeyCode::Delete => KeyInput::Chars(Self::tilde_key(3, mods)),
            KeyCode::PageUp => KeyInput::Chars(Self::tilde_key(5, mods)),
            KeyCode::PageDown => KeyInput::Chars(Self::tilde_key(6, mods)),
            _ => KeyInput::Ignored,
        }
    }

    /// Arrow, Home and End: `ESC [ <key>`, or `ESC [ 1 ; <mod> <key>` with modifiers.
    fn cursor_key(key: char, mods: KeyModifiers) -> Vec<char> {
        match Self::modifier_code(mods) {
            Some(code) => csi(&format!("1;{}{}", code, key)),
            None => vec![ESC, '[', key],
        }
    }

    /// PageUp, PageDown, Insert and Delete: `ESC [ <code> ~`.
    fn tilde_key(code: u8, mods: KeyModifiers) -> Vec<char> {
        match Self::modifier_code(mods) {
            Some(modifier) => csi(&format!("{};{}~", code, modifier)),
            None => csi(&format!("{}~", code)),
        }
    }

    /// xterm modifier parameter, `None` when no modifier is held.
    fn modifier_code(mods: KeyModifiers) -> Option<u8> {
        let code = 1
            + if mods.contains(KeyModifiers::SHIFT) { 1 } else { 0 }
            + if mods.contains(KeyModifiers::ALT) { 2 } else { 0 }
            + if mods.contains(KeyModifiers::CONTROL) { 4 } else { 0 };
        (code > 1).then_some(code)
    }

    fn map_char(ch: char, ctrl: bool, alt: bool) -> Vec<char> {
        if ctrl {
            if let Some(code) = Self::control_code(ch) {
                return if alt { vec![ESC, code] } else { vec![code] };
            }
        }
        if alt {
            return vec![ESC, ch];
        }
        vec![ch]
    }

    /// Control character produced by Ctrl + `ch`, if there is one.
    fn control_code(ch: char) -> Option<char> {
        let code = match ch {
            'a'..='z' => ch as u8 - b'a' + 1,
            'A'..='Z' => ch as u8 - b'A' + 1,
            '@' | '`' | ' ' => 0x00,
            '[' => 0x1B,
            '\\' => 0x1C,
            ']' => 0x1D,
            '^' | '~' => 0x1E,
            '_' | '?' => 0x1F,
            _ => return None,
        };
        Some(code as char)
    }
}
