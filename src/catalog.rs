/// Model used on first run and whenever a selection is not recognised.
pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    pub display_name: &'static str,
    pub wire_id: &'static str,
}

impl ModelEntry {
    const fn new(display_name: &'static str, wire_id: &'static str) -> Self {
        Self {
            display_name,
            wire_id,
        }
    }
}

/// Ordered table of selectable models. Bump `version` whenever entries change.
#[derive(Debug, Clone, Copy)]
pub struct ModelCatalog {
    pub version: u32,
    pub entries: &'static [ModelEntry],
}

const CURRENT_ENTRIES: &[ModelEntry] = &[
    ModelEntry::new("Gemini 2.0 Flash", "gemini-2.0-flash"),
    ModelEntry::new("Gemini 2.0 Flash-Lite Preview", "gemini-2.0-flash-lite"),
    ModelEntry::new("Gemini 1.5 Flash", "gemini-1.5-flash"),
    ModelEntry::new("Gemini 1.5 Flash-8B", "gemini-1.5-flash-8b"),
    ModelEntry::new("Gemini 1.5 Pro", "gemini-1.5-pro"),
];

impl ModelCatalog {
    pub const fn current() -> Self {
        Self {
            version: 3,
            entries: CURRENT_ENTRIES,
        }
    }

    pub fn display_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.display_name).collect()
    }

    /// Exact display-name lookup. Unknown names degrade to [`DEFAULT_MODEL_ID`].
    pub fn resolve_selection(&self, display_name: &str) -> &'static str {
        self.entries
            .iter()
            .find(|entry| entry.display_name == display_name)
            .map(|entry| entry.wire_id)
            .unwrap_or(DEFAULT_MODEL_ID)
    }

    pub fn contains_wire_id(&self, wire_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.wire_id == wire_id)
    }
}
