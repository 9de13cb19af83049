//! The builtin table and the default key bindings.
//!
//! Builtins act on a window through a weak [`WindowHandle`], so a window's
//! own table never keeps it alive.

use crate::keymap::{Action, Builtin, BuiltinTable, RawBinding};
use crate::mode::{ModeState, NormalMode, NormalSubstate};
use crate::surface::{scroll_by, scroll_to_edge, Axis, Navigation};
use crate::window::{Window, WindowHandle};

/// Bindings every session starts with.
pub const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    (":", "builtin:commandMode"),
    ("i", "builtin:insertMode"),
    ("o", "builtin:open"),
    ("t", "builtin:tabOpen"),
    ("w", "builtin:windowOpen"),
    ("O", "builtin:editURI"),
    ("T", "builtin:tabEditURI"),
    ("W", "builtin:windowEditURI"),
    ("H", "builtin:goBack"),
    ("L", "builtin:goForward"),
    ("r", "builtin:reload"),
    ("d", "builtin:tabClose"),
    ("j", "builtin:scrollDown"),
    ("k", "builtin:scrollUp"),
    ("h", "builtin:scrollLeft"),
    ("l", "builtin:scrollRight"),
    ("gg", "builtin:scrollToTop"),
    ("G", "builtin:scrollToBottom"),
    ("gt", "builtin:tabNext"),
    ("gT", "builtin:tabPrev"),
    ("go", "builtin:quickmarkOpen"),
    ("gn", "builtin:quickmarkTabOpen"),
    ("gw", "builtin:quickmarkWindowOpen"),
    ("gr", "builtin:quickmarksRapid"),
];

#[must_use]
pub fn default_bindings() -> Vec<RawBinding> {
    DEFAULT_BINDINGS.iter().map(|(from, to)| RawBinding::new(*from, *to)).collect()
}

fn with_window(handle: &WindowHandle, f: impl FnOnce(&Window)) {
    match handle.upgrade() {
        Some(window) => f(&window),
        None => log::debug!("builtin called on a closed window"),
    }
}

fn enter_command_line(
    handle: &WindowHandle,
    prefix: &'static str,
    with_uri: bool,
) -> impl Fn(&[String]) + Send + Sync + 'static {
    let handle = handle.clone();
    move |_| {
        with_window(&handle, |w| {
            let text = if with_uri {
                format!("{prefix}{}", w.surface().current_uri().unwrap_or_default())
            } else {
                prefix.to_string()
            };
            w.set_state(ModeState::command_line(w.ctx(), &text));
        });
    }
}

fn navigate(handle: &WindowHandle, navigation: Navigation) -> impl Fn(&[String]) + Send + Sync + 'static {
    let handle = handle.clone();
    move |_| with_window(&handle, |w| w.surface().navigate(navigation))
}

fn scroll(handle: &WindowHandle, axis: Axis, delta: i64) -> impl Fn(&[String]) + Send + Sync + 'static {
    let handle = handle.clone();
    move |_| {
        with_window(&handle, |w| {
            if let Err(err) = scroll_by(w.surface().viewport(), axis, delta) {
                log::warn!("failed to scroll: {err}");
            }
        });
    }
}

fn scroll_edge(handle: &WindowHandle, to_end: bool) -> impl Fn(&[String]) + Send + Sync + 'static {
    let handle = handle.clone();
    move |_| {
        with_window(&handle, |w| {
            if let Err(err) = scroll_to_edge(w.surface().viewport(), Axis::Vertical, to_end) {
                log::warn!("failed to scroll: {err}");
            }
        });
    }
}

fn quickmark_mode(
    handle: &WindowHandle,
    substate: NormalSubstate,
) -> impl Fn(&[String]) + Send + Sync + 'static {
    let handle = handle.clone();
    move |_| {
        with_window(&handle, |w| {
            w.set_state(ModeState::Normal(NormalMode::quickmark(w.ctx(), substate)));
        });
    }
}

/// The builtins of the window behind `handle`.
#[must_use]
pub fn builtins_for(handle: &WindowHandle, scroll_delta: i64) -> BuiltinTable {
    let mut table = BuiltinTable::new();
    let mut add = |name: &str, builtin: Builtin| {
        table.insert(name.to_string(), builtin);
    };

    add("commandMode", Builtin::new("Enter command mode.", enter_command_line(handle, "", false)));
    add("open", Builtin::new("Open a URI.", enter_command_line(handle, "open ", false)));
    add("tabOpen", Builtin::new("Open a URI in a new tab.", enter_command_line(handle, "tabopen ", false)));
    add("windowOpen", Builtin::new("Open a URI in a new window.", enter_command_line(handle, "winopen ", false)));
    add("editURI", Builtin::new("Edit the current URI.", enter_command_line(handle, "open ", true)));
    add(
        "tabEditURI",
        Builtin::new("Edit the current URI into a new tab.", enter_command_line(handle, "tabopen ", true)),
    );
    add(
        "windowEditURI",
        Builtin::new("Edit the current URI into a new window.", enter_command_line(handle, "winopen ", true)),
    );

    add("goBack", Builtin::new("Go back in history.", navigate(handle, Navigation::Back)));
    add("goForward", Builtin::new("Go forward in history.", navigate(handle, Navigation::Forward)));
    add("reload", Builtin::new("Reload the current page.", navigate(handle, Navigation::Reload)));
    add("tabClose", Builtin::new("Close the current tab.", navigate(handle, Navigation::CloseTab)));
    add("tabNext", Builtin::new("Go to the next tab.", navigate(handle, Navigation::NextTab)));
    add("tabPrev", Builtin::new("Go to the previous tab.", navigate(handle, Navigation::PrevTab)));

    add("scrollDown", Builtin::new("Scroll down.", scroll(handle, Axis::Vertical, scroll_delta)));
    add("scrollUp", Builtin::new("Scroll up.", scroll(handle, Axis::Vertical, -scroll_delta)));
    add("scrollRight", Builtin::new("Scroll right.", scroll(handle, Axis::Horizontal, scroll_delta)));
    add("scrollLeft", Builtin::new("Scroll left.", scroll(handle, Axis::Horizontal, -scroll_delta)));
    add("scrollToTop", Builtin::new("Scroll to the top of the page.", scroll_edge(handle, false)));
    add("scrollToBottom", Builtin::new("Scroll to the bottom of the page.", scroll_edge(handle, true)));

    add(
        "quickmarkOpen",
        Builtin::new("Open a quickmark.", quickmark_mode(handle, NormalSubstate::Quickmark)),
    );
    add(
        "quickmarkTabOpen",
        Builtin::new("Open a quickmark in a new tab.", quickmark_mode(handle, NormalSubstate::QuickmarkTab)),
    );
    add(
        "quickmarkWindowOpen",
        Builtin::new(
            "Open a quickmark in a new window.",
            quickmark_mode(handle, NormalSubstate::QuickmarkWindow),
        ),
    );
    add(
        "quickmarksRapid",
        Builtin::new(
            "Open quickmarks in background tabs until another key is pressed.",
            quickmark_mode(handle, NormalSubstate::QuickmarksRapid),
        ),
    );

    let insert_handle = handle.clone();
    add(
        "insertMode",
        Builtin::new("Enter insert mode.", move |_| {
            with_window(&insert_handle, |w| w.set_state(ModeState::insert(w.ctx())));
        }),
    );
    let run_handle = handle.clone();
    add(
        "runCmd",
        Builtin::new("Run the first argument as a command.", move |args| match args.first() {
            Some(line) => run_handle.run_command(line),
            None => log::warn!("runCmd called without a command"),
        }),
    );
    add("nop", Builtin::new("Do nothing.", |_| {}));
    add(
        "panic",
        Builtin {
            action: Action::Abort,
            description: "Abort immediately. For debugging only.",
        },
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{keysym, Key};
    use crate::surface::{OpenTarget, Viewport};
    use crate::test_helpers::{fixture_window, keys, SurfaceEvent};

    #[test]
    fn table_is_complete() {
        let (window, _) = fixture_window();
        let names: Vec<_> = window.builtins().keys().cloned().collect();
        for name in [
            "commandMode", "editURI", "goBack", "goForward", "insertMode", "nop", "open", "panic", "reload",
            "runCmd", "scrollDown", "scrollUp", "scrollLeft", "scrollRight", "scrollToTop", "scrollToBottom",
            "tabClose", "tabEditURI", "tabNext", "tabOpen", "tabPrev", "windowEditURI", "windowOpen",
            "quickmarkOpen", "quickmarkTabOpen", "quickmarkWindowOpen", "quickmarksRapid",
        ] {
            assert!(names.iter().any(|n| n == name), "missing builtin {name}");
        }
        assert_eq!(names.len(), 26);
    }

    #[test]
    fn default_bindings_all_resolve() {
        let (window, _) = fixture_window();
        assert!(window.state().status().is_none(), "default bindings should parse cleanly");
        assert_eq!(window.bindings().len(), DEFAULT_BINDINGS.len());
    }

    #[test]
    fn open_builtins_prefill_the_command_line() {
        let (window, surface) = fixture_window();
        surface.set_uri("https://example.com");
        window.handle_keys(&keys("T"));
        assert_eq!(window.state().to_string(), ":tabopen https://example.com");
        window.handle_key(Key::named(keysym::ESCAPE));
        window.handle_keys(&keys("o"));
        assert_eq!(window.state().to_string(), ":open ");
    }

    #[test]
    fn scroll_builtins_use_the_configured_delta() {
        let (window, surface) = fixture_window();
        window.handle_keys(&keys("jjl"));
        assert_eq!(surface.viewport().offset(Axis::Vertical), Ok(80));
        assert_eq!(surface.viewport().offset(Axis::Horizontal), Ok(40));
        window.handle_keys(&keys("G"));
        assert_eq!(surface.viewport().offset(Axis::Vertical), Ok(5000));
        window.handle_keys(&keys("gg"));
        assert_eq!(surface.viewport().offset(Axis::Vertical), Ok(0));
    }

    #[test]
    fn scroll_errors_are_not_fatal() {
        let (window, surface) = fixture_window();
        surface.break_viewport();
        assert!(window.handle_keys(&keys("j")));
        assert!(window.state().status().is_none());
    }

    #[test]
    fn navigation_builtins() {
        let (window, surface) = fixture_window();
        window.handle_keys(&keys("HLrdgtgT"));
        assert_eq!(
            surface.events(),
            [
                SurfaceEvent::Navigate(Navigation::Back),
                SurfaceEvent::Navigate(Navigation::Forward),
                SurfaceEvent::Navigate(Navigation::Reload),
                SurfaceEvent::Navigate(Navigation::CloseTab),
                SurfaceEvent::Navigate(Navigation::NextTab),
                SurfaceEvent::Navigate(Navigation::PrevTab),
            ]
        );
    }

    #[test]
    fn run_cmd_runs_its_argument() {
        let (window, surface) = fixture_window();
        window.run_command("bind x \"b:runCmd 'open example.com'\"");
        window.handle_keys(&keys("x"));
        assert_eq!(surface.events(), [SurfaceEvent::Open("example.com".to_string(), OpenTarget::Current)]);
    }

    #[test]
    fn run_cmd_without_argument_does_nothing() {
        let (window, surface) = fixture_window();
        window.run_command("bind x b:runCmd");
        assert!(window.handle_keys(&keys("x")));
        assert!(surface.events().is_empty());
        assert!(window.state().status().is_none());
    }

    #[test]
    fn insert_mode_builtin() {
        let (window, _) = fixture_window();
        window.handle_keys(&keys("i"));
        assert_eq!(window.state().name(), "INSERT");
        assert!(!window.handle_keys(&keys("j")));
        window.handle_key(Key::named(keysym::ESCAPE));
        assert_eq!(window.state().name(), "NORMAL");
    }

    #[test]
    fn builtins_on_a_closed_window_do_nothing() {
        let (window, _) = fixture_window();
        let table = builtins_for(&window.handle(), 40);
        drop(window);
        table["commandMode"].action.invoke(&[]);
        table["scrollDown"].action.invoke(&[]);
    }
}
