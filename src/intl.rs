// Localized message lookup. The host application usually supplies its own
// resolver; the bundled catalog carries the workflow messages in English.

use std::collections::HashMap;

/// Message keys used by the form workflows.
pub mod keys {
    pub const LINKED_BUILDINGS_ERROR: &str = "linked-buildings.error";
    pub const BUILDING_SAVE_SUCCESS: &str = "building.save-success";
    pub const BUILDING_SAVE_ERROR: &str = "building.save-error";
}

/// Resolver from message key to display string.
pub trait Localizer: Send + Sync {
    fn t(&self, key: &str) -> String;
}

/// In-memory key → message catalog. Unknown keys render as the key itself so
/// a missing translation is visible instead of silent.
#[derive(Debug)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            messages: HashMap::new(),
        };
        catalog.insert(
            keys::LINKED_BUILDINGS_ERROR,
            "The linked buildings could not be loaded.",
        );
        catalog.insert(keys::BUILDING_SAVE_SUCCESS, "Building saved.");
        catalog.insert(keys::BUILDING_SAVE_ERROR, "The building could not be saved.");
        catalog
    }

    pub fn insert(&mut self, key: &str, message: &str) {
        self.messages.insert(key.to_string(), message.to_string());
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer for MessageCatalog {
    fn t(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
