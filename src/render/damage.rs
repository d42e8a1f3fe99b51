use std::collections::HashMap;

use blake3::Hash;

use crate::error::Result;
use crate::font::Font;
use crate::registry::{GadgetId, Registry};

use super::visual::{GadgetVisual, drawing_order};

/// Gadgets whose visual state differs from the previous collection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Damage {
    /// Changed or newly visible gadgets, in drawing order.
    pub changed: Vec<GadgetId>,
    /// Gadgets seen last time that no longer exist.
    pub removed: Vec<GadgetId>,
}

impl Damage {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Tracks a blake3 digest of every gadget's [`GadgetVisual`].
#[derive(Debug, Default)]
pub struct DamageTracker {
    hashes: HashMap<GadgetId, Hash>,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(
        &mut self,
        registry: &Registry,
        font: &dyn Font,
        min_knob: i32,
    ) -> Result<Damage> {
        let mut damage = Damage::default();
        let mut next = HashMap::with_capacity(self.hashes.len());

        for gadget in drawing_order(registry) {
            let Some(visual) = GadgetVisual::capture(registry, gadget, font, min_knob) else {
                continue;
            };
            let bytes = serde_json::to_vec(&visual)?;
            let hash = blake3::hash(&bytes);
            if self.hashes.get(&gadget) != Some(&hash) {
                damage.changed.push(gadget);
            }
            next.insert(gadget, hash);
        }

        damage.removed = self
            .hashes
            .keys()
            .filter(|id| !next.contains_key(id))
            .copied()
            .collect();
        self.hashes = next;
        Ok(damage)
    }

    /// Forget all digests so the next collection reports everything.
    pub fn reset(&mut self) {
        self.hashes.clear();
    }
}
