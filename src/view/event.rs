/// Outcome of delivering an input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EventResult {
    /// A view consumed the event.
    Handled,
    /// Nobody took it; dispatch continues with the next candidate.
    #[default]
    Unhandled,
}

impl EventResult {
    /// `true` for [`EventResult::Handled`].
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }

    /// Legacy integer encoding: `1` handled, `-1` unhandled.
    pub fn to_legacy(self) -> i32 {
        match self {
            Self::Handled => 1,
            Self::Unhandled => -1,
        }
    }
}

impl From<bool> for EventResult {
    fn from(handled: bool) -> Self {
        if handled { Self::Handled } else { Self::Unhandled }
    }
}

/// Non-character keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum VirtualKey {
    Back,
    Tab,
    Clear,
    Return,
    Escape,
    Space,
    End,
    Home,
    Left,
    Up,
    Right,
    Down,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Enter,
    F(u8),
}

/// Modifier keys held during a key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    /// Shift.
    pub shift: bool,
    /// Alternate / option.
    pub alt: bool,
    /// Control (command on macOS).
    pub control: bool,
}

/// One keyboard event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode {
    /// Printable character, if any.
    pub character: Option<char>,
    /// Virtual key, if any.
    pub virt: Option<VirtualKey>,
    /// Modifiers.
    pub modifiers: KeyModifiers,
}

impl KeyCode {
    /// Printable character key.
    pub fn char(c: char) -> Self {
        Self {
            character: Some(c),
            ..Self::default()
        }
    }

    /// Virtual key.
    pub fn virt(key: VirtualKey) -> Self {
        Self {
            virt: Some(key),
            ..Self::default()
        }
    }

    /// Same key with shift held.
    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub(crate) fn is_tab(&self) -> bool {
        self.virt == Some(VirtualKey::Tab)
    }
}

/// One entry of a drag payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragItem {
    /// Plain text.
    Text(String),
    /// File path.
    File(String),
    /// Opaque bytes.
    Binary(Vec<u8>),
}

/// Kind of data carried by a drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragType {
    /// Files.
    File,
    /// Text.
    Text,
    /// Mixed or unknown.
    #[default]
    Unknown,
}

/// Decoded platform drag data handed to `on_drop` and the drag-tracking hooks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragPayload {
    /// Items in platform order.
    pub items: Vec<DragItem>,
    /// Payload kind.
    pub kind: DragType,
}

impl DragPayload {
    /// Payload of a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            items: vec![DragItem::Text(text.into())],
            kind: DragType::Text,
        }
    }

    /// Payload of file paths.
    pub fn files<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: paths.into_iter().map(|p| DragItem::File(p.into())).collect(),
            kind: DragType::File,
        }
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.items.len()
    }
}
