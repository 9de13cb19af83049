//! The canonical key model.
//!
//! A [`Key`] is a keyval plus the modifier mask that was held when it was
//! pressed. Only Control and Alt take part in binding comparisons; every
//! other modifier bit is carried along but ignored by [`Key::matches`].

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use super::keysym;
use crate::error::KeyParseError;

bitflags! {
    /// Modifier mask of a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u32 {
        const SHIFT = 1;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
        const SUPER = 1 << 26;
        const HYPER = 1 << 27;
        const META = 1 << 28;
        const RELEASE = 1 << 30;
    }
}

impl KeyModifiers {
    /// Alt is reported as the first generic modifier.
    pub const ALT: Self = Self::MOD1;

    /// The modifiers considered when comparing keys for bindings.
    pub const COMPARISON: Self = Self::CONTROL.union(Self::ALT);
}

/// Runes that are always rendered by name.
const NEVER_PRINT: &[char] = &['\t', '\n', '\r', '\u{b}', '\u{c}', '\u{8}'];

/// Runes rendered by name only in selective (human-readable) output.
const SELECTIVE_NEVER_PRINT: &[char] = &[' ', '<'];

/// Keys the program injects into sequences for its own bookkeeping.
///
/// They can never be typed and are never offered as completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualKey {
    QuickmarkOpen,
    QuickmarkTab,
    QuickmarkWindow,
    QuickmarksRapid,
}

impl VirtualKey {
    const ALL: [Self; 4] = [Self::QuickmarkOpen, Self::QuickmarkTab, Self::QuickmarkWindow, Self::QuickmarksRapid];

    fn keyval(self) -> u32 {
        keysym::VIRTUAL_BASE
            + match self {
                Self::QuickmarkOpen => 1,
                Self::QuickmarkTab => 2,
                Self::QuickmarkWindow => 3,
                Self::QuickmarksRapid => 4,
            }
    }

    fn name(self) -> &'static str {
        match self {
            Self::QuickmarkOpen => "quickmark",
            Self::QuickmarkTab => "quickmark-tab",
            Self::QuickmarkWindow => "quickmark-window",
            Self::QuickmarksRapid => "quickmarks-rapid",
        }
    }
}

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub keyval: u32,
    pub modifiers: KeyModifiers,
    pub is_modifier: bool,
}

impl Key {
    #[must_use]
    pub const fn new(keyval: u32, modifiers: KeyModifiers) -> Self {
        Self {
            keyval,
            modifiers,
            is_modifier: false,
        }
    }

    /// Build a key from a native event: the keyval, the raw modifier state
    /// and whether the key itself is a modifier key.
    #[must_use]
    pub fn from_event(keyval: u32, modifiers: KeyModifiers, is_modifier: bool) -> Self {
        Self {
            keyval,
            modifiers,
            is_modifier: is_modifier || keysym::is_modifier_keyval(keyval),
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Self {
        Self::new(keysym::char_to_keyval(c), KeyModifiers::empty())
    }

    #[must_use]
    pub const fn named(keyval: u32) -> Self {
        Self::new(keyval, KeyModifiers::empty())
    }

    #[must_use]
    pub fn virtual_key(key: VirtualKey) -> Self {
        Self::named(key.keyval())
    }

    #[must_use]
    pub fn is_virtual(&self) -> bool {
        (keysym::VIRTUAL_BASE..=keysym::VIRTUAL_END).contains(&self.keyval)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Drop every modifier outside [`KeyModifiers::COMPARISON`].
    #[must_use]
    pub fn normalize(self) -> Self {
        Self {
            keyval: self.keyval,
            modifiers: self.modifiers & KeyModifiers::COMPARISON,
            is_modifier: false,
        }
    }

    /// Binding equality: same keyval and same Control/Alt state.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.normalize() == other.normalize()
    }

    /// Whether this key matches `keyval` with neither Control nor Alt held.
    #[must_use]
    pub fn is(&self, keyval: u32) -> bool {
        self.matches(&Self::named(keyval))
    }

    /// The character this key produces, if it has one.
    #[must_use]
    pub fn to_char(&self) -> Option<char> {
        keysym::keyval_to_char(self.keyval)
    }

    /// The character to insert into a text field for this key, if any.
    #[must_use]
    pub fn text_char(&self) -> Option<char> {
        if self.modifiers.intersects(KeyModifiers::COMPARISON) {
            return None;
        }
        self.to_char().filter(|c| !c.is_control())
    }

    /// Render this key.
    ///
    /// `selective` prefers symbolic names for space and `<`, which is what a
    /// status display wants; without it those characters are rendered
    /// literally, as a command line needs them.
    #[must_use]
    pub fn to_string_selective(&self, selective: bool) -> String {
        let mut out = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            out.push_str("C-");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            out.push_str("A-");
        }
        if let Some(virt) = VirtualKey::ALL.into_iter().find(|v| v.keyval() == self.keyval) {
            out.push_str(virt.name());
            return out;
        }
        match self.to_char() {
            Some(c) if !is_non_print(c, selective) => out.push(c),
            _ => out.push_str(&keysym::keyval_name(self.keyval)),
        }
        out
    }
}

fn is_non_print(c: char, selective: bool) -> bool {
    NEVER_PRINT.contains(&c) || (selective && SELECTIVE_NEVER_PRINT.contains(&c))
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_selective(true))
    }
}

/// Parse a key description such as `a`, `C-a`, `A-C-Escape` or `less`.
///
/// Any number of leading `C-`/`A-` prefixes set Control/Alt. The remainder
/// is a single character or a key name.
pub fn parse_key(text: &str) -> Result<Key, KeyParseError> {
    let mut rest = text;
    let mut modifiers = KeyModifiers::empty();
    loop {
        if let Some(stripped) = rest.strip_prefix("C-") {
            modifiers |= KeyModifiers::CONTROL;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("A-") {
            modifiers |= KeyModifiers::ALT;
            rest = stripped;
        } else {
            break;
        }
    }

    let mut chars = rest.chars();
    let keyval = match (chars.next(), chars.next()) {
        (Some(c), None) => keysym::char_to_keyval(c),
        _ => keysym::keyval_from_name(rest),
    };
    if keyval == keysym::VOID {
        return Err(KeyParseError(text.to_string()));
    }
    Ok(Key::new(keyval, modifiers))
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_char() {
        let key = parse_key("a").expect("should parse");
        assert_eq!(key, Key::from_char('a'));
        assert!(key.modifiers.is_empty());
    }

    #[test]
    fn parse_modifier_prefixes_in_any_order() {
        let ca = parse_key("C-A-x").expect("should parse");
        let ac = parse_key("A-C-x").expect("should parse");
        assert_eq!(ca, ac);
        assert_eq!(ca.modifiers, KeyModifiers::CONTROL | KeyModifiers::ALT);
    }

    #[test]
    fn parse_duplicate_prefixes_are_idempotent() {
        let key = parse_key("C-C-a").expect("should parse");
        assert_eq!(key, parse_key("C-a").expect("should parse"));
    }

    #[test]
    fn parse_named_key() {
        let key = parse_key("Escape").expect("should parse");
        assert_eq!(key.keyval, keysym::ESCAPE);
        let key = parse_key("C-Return").expect("should parse");
        assert_eq!(key.keyval, keysym::RETURN);
        assert!(key.modifiers.contains(KeyModifiers::CONTROL));
    }

    #[test]
    fn parse_dash_after_prefix() {
        let key = parse_key("C--").expect("should parse");
        assert_eq!(key.keyval, u32::from('-'));
    }

    #[test]
    fn parse_failure_reports_original_text() {
        assert_eq!(parse_key("C-Bogus"), Err(KeyParseError("C-Bogus".to_string())));
        assert!(parse_key("C-").is_err());
        assert!(parse_key("").is_err());
    }

    #[test]
    fn matches_ignores_non_comparison_modifiers() {
        let plain = Key::from_char('a');
        let shifted = plain.with_modifiers(KeyModifiers::SHIFT | KeyModifiers::LOCK);
        let ctrl = plain.with_modifiers(KeyModifiers::CONTROL);
        assert!(plain.matches(&shifted));
        assert!(!plain.matches(&ctrl));
        assert_ne!(plain, shifted);
    }

    #[test]
    fn render_prefixes_control_before_alt() {
        let key = Key::from_char('x').with_modifiers(KeyModifiers::ALT | KeyModifiers::CONTROL);
        assert_eq!(key.to_string(), "C-A-x");
    }

    #[test]
    fn render_selective_names_space_and_less() {
        let space = Key::from_char(' ');
        let less = Key::from_char('<');
        assert_eq!(space.to_string_selective(true), "space");
        assert_eq!(less.to_string_selective(true), "less");
        assert_eq!(space.to_string_selective(false), " ");
        assert_eq!(less.to_string_selective(false), "<");
    }

    #[test]
    fn render_never_print_runes_by_name() {
        assert_eq!(Key::from_char('\t').to_string_selective(false), "Tab");
        assert_eq!(Key::from_char('\r').to_string_selective(false), "Return");
        assert_eq!(Key::named(keysym::ESCAPE).to_string(), "Escape");
    }

    #[test]
    fn modifier_keys_are_flagged_from_events() {
        let key = Key::from_event(0xffe3, KeyModifiers::empty(), false);
        assert!(key.is_modifier);
        let key = Key::from_event(u32::from('a'), KeyModifiers::CONTROL, false);
        assert!(!key.is_modifier);
    }

    #[test]
    fn virtual_keys_cannot_be_parsed() {
        let virt = Key::virtual_key(VirtualKey::QuickmarkTab);
        assert!(virt.is_virtual());
        assert_eq!(virt.to_string(), "quickmark-tab");
        assert!(!parse_key("quickmark-tab").map(|k| k.is_virtual()).unwrap_or(false));
    }

    #[test]
    fn text_char_rejects_modified_and_control_keys() {
        assert_eq!(Key::from_char('a').text_char(), Some('a'));
        assert_eq!(Key::from_char(' ').text_char(), Some(' '));
        assert_eq!(Key::from_char('a').with_modifiers(KeyModifiers::CONTROL).text_char(), None);
        assert_eq!(Key::from_char('\t').text_char(), None);
        assert_eq!(Key::named(keysym::LEFT).text_char(), None);
    }
}
