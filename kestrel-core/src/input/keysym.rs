//! Keyval codes and the named-key table.
//!
//! Keyvals follow the X11 keysym numbering so that a native event source
//! can hand its codes over unchanged: Latin-1 characters map to their own
//! code point, other Unicode characters to `0x0100_0000 | code point`, and
//! named keys (Escape, Return, ...) to the `0xff00` block.

pub const VOID: u32 = 0x00ff_ffff;

pub const BACKSPACE: u32 = 0xff08;
pub const TAB: u32 = 0xff09;
pub const LINEFEED: u32 = 0xff0a;
pub const RETURN: u32 = 0xff0d;
pub const ESCAPE: u32 = 0xff1b;
pub const DELETE: u32 = 0xffff;
pub const HOME: u32 = 0xff50;
pub const LEFT: u32 = 0xff51;
pub const UP: u32 = 0xff52;
pub const RIGHT: u32 = 0xff53;
pub const DOWN: u32 = 0xff54;
pub const PAGE_UP: u32 = 0xff55;
pub const PAGE_DOWN: u32 = 0xff56;
pub const END: u32 = 0xff57;
pub const INSERT: u32 = 0xff63;
pub const KP_ENTER: u32 = 0xff8d;
pub const F1: u32 = 0xffbe;

const UNICODE_OFFSET: u32 = 0x0100_0000;
const UNICODE_MAX: u32 = UNICODE_OFFSET + 0x0010_ffff;

/// Keyvals in this block are reserved for keys the program injects itself.
pub const VIRTUAL_BASE: u32 = 0x2000_0000;
pub const VIRTUAL_END: u32 = 0x2000_ffff;

/// Named keys, looked up by exact (case-sensitive) name.
const NAMED_KEYS: &[(&str, u32)] = &[
    ("BackSpace", BACKSPACE),
    ("Tab", TAB),
    ("Linefeed", LINEFEED),
    ("Clear", 0xff0b),
    ("Return", RETURN),
    ("Pause", 0xff13),
    ("Scroll_Lock", 0xff14),
    ("Escape", ESCAPE),
    ("Delete", DELETE),
    ("Home", HOME),
    ("Left", LEFT),
    ("Up", UP),
    ("Right", RIGHT),
    ("Down", DOWN),
    ("Page_Up", PAGE_UP),
    ("Page_Down", PAGE_DOWN),
    ("End", END),
    ("Insert", INSERT),
    ("Menu", 0xff67),
    ("KP_Enter", KP_ENTER),
    ("ISO_Left_Tab", 0xfe20),
    ("F1", F1),
    ("F2", F1 + 1),
    ("F3", F1 + 2),
    ("F4", F1 + 3),
    ("F5", F1 + 4),
    ("F6", F1 + 5),
    ("F7", F1 + 6),
    ("F8", F1 + 7),
    ("F9", F1 + 8),
    ("F10", F1 + 9),
    ("F11", F1 + 10),
    ("F12", F1 + 11),
    ("Shift_L", 0xffe1),
    ("Shift_R", 0xffe2),
    ("Control_L", 0xffe3),
    ("Control_R", 0xffe4),
    ("Caps_Lock", 0xffe5),
    ("Meta_L", 0xffe7),
    ("Meta_R", 0xffe8),
    ("Alt_L", 0xffe9),
    ("Alt_R", 0xffea),
    ("Super_L", 0xffeb),
    ("Super_R", 0xffec),
    ("space", 0x20),
    ("exclam", 0x21),
    ("quotedbl", 0x22),
    ("numbersign", 0x23),
    ("dollar", 0x24),
    ("percent", 0x25),
    ("ampersand", 0x26),
    ("apostrophe", 0x27),
    ("parenleft", 0x28),
    ("parenright", 0x29),
    ("asterisk", 0x2a),
    ("plus", 0x2b),
    ("comma", 0x2c),
    ("minus", 0x2d),
    ("period", 0x2e),
    ("slash", 0x2f),
    ("colon", 0x3a),
    ("semicolon", 0x3b),
    ("less", 0x3c),
    ("equal", 0x3d),
    ("greater", 0x3e),
    ("question", 0x3f),
    ("at", 0x40),
    ("bracketleft", 0x5b),
    ("backslash", 0x5c),
    ("bracketright", 0x5d),
    ("asciicircum", 0x5e),
    ("underscore", 0x5f),
    ("grave", 0x60),
    ("braceleft", 0x7b),
    ("bar", 0x7c),
    ("braceright", 0x7d),
    ("asciitilde", 0x7e),
];

/// Modifier keyvals: pressing one of these alone never forms a binding.
pub fn is_modifier_keyval(keyval: u32) -> bool {
    (0xffe1..=0xffee).contains(&keyval)
}

fn is_latin1(code: u32) -> bool {
    (0x20..=0x7e).contains(&code) || (0xa0..=0xff).contains(&code)
}

/// Map a single character to its keyval. Never returns [`VOID`].
#[must_use]
pub fn char_to_keyval(c: char) -> u32 {
    match c {
        '\u{8}' => BACKSPACE,
        '\t' => TAB,
        '\n' => LINEFEED,
        '\r' => RETURN,
        '\u{1b}' => ESCAPE,
        '\u{7f}' => DELETE,
        c if is_latin1(c as u32) => c as u32,
        c => UNICODE_OFFSET | c as u32,
    }
}

/// The character a keyval produces, if any.
///
/// Whitespace control keys (Tab, Return, ...) report their control
/// character; every other control character reports `None`.
#[must_use]
pub fn keyval_to_char(keyval: u32) -> Option<char> {
    match keyval {
        BACKSPACE => Some('\u{8}'),
        TAB => Some('\t'),
        LINEFEED => Some('\n'),
        RETURN | KP_ENTER => Some('\r'),
        code if is_latin1(code) => char::from_u32(code),
        code if (UNICODE_OFFSET..=UNICODE_MAX).contains(&code) => {
            char::from_u32(code - UNICODE_OFFSET).filter(|c| !c.is_control() || is_layout_char(*c))
        }
        _ => None,
    }
}

fn is_layout_char(c: char) -> bool {
    matches!(c, '\u{b}' | '\u{c}')
}

/// Look up a keyval by name.
///
/// Besides the named-key table, `U<hex>` names address any Unicode
/// character. Unknown names yield [`VOID`].
#[must_use]
pub fn keyval_from_name(name: &str) -> u32 {
    if let Some((_, keyval)) = NAMED_KEYS.iter().find(|(n, _)| *n == name) {
        return *keyval;
    }
    name.strip_prefix('U')
        .filter(|hex| !hex.is_empty() && hex.len() <= 6)
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .and_then(char::from_u32)
        .map_or(VOID, char_to_keyval)
}

/// The symbolic name of a keyval.
#[must_use]
pub fn keyval_name(keyval: u32) -> String {
    if let Some((name, _)) = NAMED_KEYS.iter().find(|(_, k)| *k == keyval) {
        return (*name).to_string();
    }
    if is_latin1(keyval) {
        if let Some(c) = char::from_u32(keyval) {
            return c.to_string();
        }
    }
    if (UNICODE_OFFSET..=UNICODE_MAX).contains(&keyval) {
        return format!("U{:04X}", keyval - UNICODE_OFFSET);
    }
    format!("0x{keyval:x}")
}
