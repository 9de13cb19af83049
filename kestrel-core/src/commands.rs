//! The standard typable commands.

use crate::error::CommandError;
use crate::mode::Status;
use crate::registry::UriEntry;
use crate::surface::{Navigation, OpenTarget};
use crate::window::Window;

type CommandFun = fn(&Window, &[String]) -> Result<(), CommandError>;

pub struct TypableCommand {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub doc: &'static str,
    pub fun: CommandFun,
}

/// Commands whose arguments from the first on are a URI.
pub(crate) const OPEN_FAMILY: &[&str] = &[
    "o",
    "open",
    "t",
    "topen",
    "tabopen",
    "newtab",
    "bg",
    "bgopen",
    "backgroundopen",
    "w",
    "wopen",
    "winopen",
    "windowopen",
];

/// Commands whose arguments from the second on are a URI.
pub(crate) const QUICKMARK_ADD_FAMILY: &[&str] = &["aqm", "addquickmark", "qm", "quickmark"];

pub(crate) const QUICKMARK_REMOVE_FAMILY: &[&str] = &["rmqm", "removequickmark"];

fn open_with(window: &Window, args: &[String], target: OpenTarget) -> Result<(), CommandError> {
    let uri = if args.is_empty() {
        window.session().config().new_tab_page.clone()
    } else {
        args.join(" ")
    };
    log::debug!("opening '{uri}' in {target:?}");
    window.surface().open(&uri, target);
    Ok(())
}

fn open(window: &Window, args: &[String]) -> Result<(), CommandError> {
    open_with(window, args, OpenTarget::Current)
}

fn tab_open(window: &Window, args: &[String]) -> Result<(), CommandError> {
    open_with(window, args, OpenTarget::NewTab)
}

fn background_open(window: &Window, args: &[String]) -> Result<(), CommandError> {
    open_with(window, args, OpenTarget::Background)
}

fn window_open(window: &Window, args: &[String]) -> Result<(), CommandError> {
    open_with(window, args, OpenTarget::NewWindow)
}

fn bind(window: &Window, args: &[String]) -> Result<(), CommandError> {
    let [from, to] = args else {
        return Err(CommandError::Usage("bind <keys> <action>"));
    };
    window.session().bind(from, to);
    Ok(())
}

fn set(window: &Window, args: &[String]) -> Result<(), CommandError> {
    let [name, value] = args else {
        return Err(CommandError::Usage("set <webkit:name> <value>"));
    };
    let value = window.session().set_setting(name, value)?;
    window.show_status(Status::Info(format!("{name} = {value}")));
    Ok(())
}

fn add_quickmark(window: &Window, args: &[String]) -> Result<(), CommandError> {
    let (name, uri) = match args {
        [] => return Err(CommandError::Usage("addquickmark <name> [uri]")),
        [name] => {
            let uri = window
                .surface()
                .current_uri()
                .ok_or(CommandError::Usage("addquickmark <name> [uri]"))?;
            (name, uri)
        }
        [name, rest @ ..] => (name, rest.join(" ")),
    };
    window.session().add_quickmark(name, UriEntry::new(uri, ""));
    Ok(())
}

fn remove_quickmark(window: &Window, args: &[String]) -> Result<(), CommandError> {
    let [name] = args else {
        return Err(CommandError::Usage("removequickmark <name>"));
    };
    match window.session().remove_quickmark(name) {
        Some(_) => Ok(()),
        None => Err(CommandError::NoSuchQuickmark(name.clone())),
    }
}

fn quit(window: &Window, _args: &[String]) -> Result<(), CommandError> {
    window.surface().navigate(Navigation::Quit);
    Ok(())
}

pub const TYPABLE_COMMANDS: &[TypableCommand] = &[
    TypableCommand {
        name: "open",
        aliases: &["o"],
        doc: "Open a URI in the current view.",
        fun: open,
    },
    TypableCommand {
        name: "tabopen",
        aliases: &["t", "topen", "newtab"],
        doc: "Open a URI in a new tab.",
        fun: tab_open,
    },
    TypableCommand {
        name: "backgroundopen",
        aliases: &["bg", "bgopen"],
        doc: "Open a URI in a new background tab.",
        fun: background_open,
    },
    TypableCommand {
        name: "windowopen",
        aliases: &["w", "wopen", "winopen"],
        doc: "Open a URI in a new window.",
        fun: window_open,
    },
    TypableCommand {
        name: "bind",
        aliases: &[],
        doc: "Bind a key sequence to a builtin or command.",
        fun: bind,
    },
    TypableCommand {
        name: "set",
        aliases: &[],
        doc: "Change a content setting.",
        fun: set,
    },
    TypableCommand {
        name: "addquickmark",
        aliases: &["aqm", "qm", "quickmark"],
        doc: "Add a quickmark for a URI, or for the current page.",
        fun: add_quickmark,
    },
    TypableCommand {
        name: "removequickmark",
        aliases: &["rmqm"],
        doc: "Remove a quickmark.",
        fun: remove_quickmark,
    },
    TypableCommand {
        name: "quit",
        aliases: &["q", "qall", "quitall"],
        doc: "Close the browser.",
        fun: quit,
    },
];
