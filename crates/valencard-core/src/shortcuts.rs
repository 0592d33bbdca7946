//! Keyboard shortcut registry.

use crate::interaction::Modifiers;

/// Editor action bound to a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    Duplicate,
    DeleteSelected,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone, Copy)]
pub struct Shortcut {
    pub key: &'static str,
    /// Requires Ctrl (or Cmd).
    pub command: bool,
    pub shift: bool,
    pub action: EditorCommand,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command: bool,
        shift: bool,
        action: EditorCommand,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command,
            shift,
            action,
            description,
        }
    }

    /// Whether a key press triggers this shortcut. Keys compare case-insensitively.
    pub fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.command == modifiers.command()
            && self.shift == modifiers.shift
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

const DELETE_LABEL: &str = "Delete selected element";

const SHORTCUTS: &[Shortcut] = &[
    Shortcut::new("Z", true, false, EditorCommand::Undo, "Undo"),
    Shortcut::new("Z", true, true, EditorCommand::Redo, "Redo"),
    Shortcut::new("Y", true, false, EditorCommand::Redo, "Redo"),
    Shortcut::new("X", true, false, EditorCommand::Cut, "Cut selected element"),
    Shortcut::new("C", true, false, EditorCommand::Copy, "Copy selected element"),
    Shortcut::new("V", true, false, EditorCommand::Paste, "Paste element"),
    Shortcut::new("D", true, false, EditorCommand::Duplicate, "Duplicate selected element"),
    Shortcut::new("Delete", false, false, EditorCommand::DeleteSelected, DELETE_LABEL),
    Shortcut::new("Backspace", false, false, EditorCommand::DeleteSelected, DELETE_LABEL),
];

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> &'static [Shortcut] {
        SHORTCUTS
    }

    /// Command bound to a key press, if any.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<EditorCommand> {
        SHORTCUTS
            .iter()
            .find(|s| s.matches(key, modifiers))
            .map(|s| s.action)
    }
}
