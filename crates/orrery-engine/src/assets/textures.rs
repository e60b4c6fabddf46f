use std::collections::HashMap;

use crate::api::types::TextureId;

/// Load state of one texture URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureStatus {
    #[default]
    Pending,
    Loaded,
    /// The fetch or decode failed; draws keep the flat material colour.
    Failed,
}

#[derive(Debug, Clone)]
struct TextureEntry {
    url: String,
    status: TextureStatus,
}

/// Registry of texture URLs referenced by the scene.
/// The same URL registered twice maps to the same id.
#[derive(Debug, Clone)]
pub struct TextureRegistry {
    entries: Vec<TextureEntry>,
    by_url: HashMap<String, TextureId>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            by_url: HashMap::new(),
        }
    }

    pub fn register(&mut self, url: &str) -> TextureId {
        if let Some(id) = self.by_url.get(url) {
            return *id;
        }
        let id = TextureId(self.entries.len() as u32);
        self.entries.push(TextureEntry {
            url: url.to_string(),
            status: TextureStatus::Pending,
        });
        self.by_url.insert(url.to_string(), id);
        id
    }

    pub fn status(&self, id: TextureId) -> Option<TextureStatus> {
        self.entries.get(id.0 as usize).map(|e| e.status)
    }

    pub fn url(&self, id: TextureId) -> Option<&str> {
        self.entries.get(id.0 as usize).map(|e| e.url.as_str())
    }

    /// Whether draws may sample this texture.
    pub fn is_ready(&self, id: TextureId) -> bool {
        self.status(id) == Some(TextureStatus::Loaded)
    }

    pub fn mark_loaded(&mut self, id: TextureId) {
        if let Some(entry) = self.entries.get_mut(id.0 as usize) {
            entry.status = TextureStatus::Loaded;
            log::debug!("texture {} loaded", entry.url);
        }
    }

    pub fn mark_failed(&mut self, id: TextureId) {
        if let Some(entry) = self.entries.get_mut(id.0 as usize) {
            entry.status = TextureStatus::Failed;
            log::warn!("texture {} failed to load, keeping flat colour", entry.url);
        }
    }

    /// All registered textures in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &str, TextureStatus)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (TextureId(i as u32), e.url.as_str(), e.status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_dedupes_urls() {
        let mut reg = TextureRegistry::new();
        let a = reg.register("textures/earth.jpg");
        let b = reg.register("textures/moon.jpg");
        let c = reg.register("textures/earth.jpg");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.url(b), Some("textures/moon.jpg"));
    }

    #[test]
    fn status_transitions() {
        let mut reg = TextureRegistry::new();
        let id = reg.register("textures/sun.jpg");
        assert_eq!(reg.status(id), Some(TextureStatus::Pending));
        assert!(!reg.is_ready(id));
        reg.mark_loaded(id);
        assert!(reg.is_ready(id));
        reg.mark_failed(id);
        assert_eq!(reg.status(id), Some(TextureStatus::Failed));
        assert!(!reg.is_ready(id));
    }

    #[test]
    fn unknown_id_is_none() {
        let mut reg = TextureRegistry::new();
        assert!(reg.status(TextureId(7)).is_none());
        reg.mark_loaded(TextureId(7));
        assert!(reg.is_empty());
    }
}
