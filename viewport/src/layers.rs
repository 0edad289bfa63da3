//! Layer registry: the UI-facing list of named layers and their visibility.
//!
//! The registry is rebuilt on every load, never patched. Toggles go through
//! [`LayerRegistry::toggle`], which updates the registry and the surface in the
//! same call.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use std::collections::HashSet;

use serde::Serialize;

use crate::error::ViewportError;
use crate::metadata::LayerRecord;
use crate::surface::DrawingSurface;

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub frozen: bool,
    pub hidden: bool,
    pub plottable: bool,
}

impl Layer {
    fn candidate(name: String) -> Self {
        Self { name, visible: true, frozen: false, hidden: false, plottable: true }
    }
}

impl From<LayerRecord> for Layer {
    fn from(r: LayerRecord) -> Self {
        Self { name: r.name, visible: !r.off, frozen: r.frozen, hidden: r.hidden, plottable: r.plottable }
    }
}

/// Where a registry's layers came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    /// A conversion layer table, used verbatim.
    Table(Vec<LayerRecord>),
    /// Layer keys discovered in the drawing, all initially visible.
    Candidates(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
}

impl LayerRegistry {
    /// Build a registry in declaration order. Repeated names keep the first.
    #[must_use]
    pub fn init_from(source: LayerSource) -> Self {
        let incoming: Vec<Layer> = match source {
            LayerSource::Table(records) => records.into_iter().map(Layer::from).collect(),
            LayerSource::Candidates(names) => names.into_iter().map(Layer::candidate).collect(),
        };
        let mut seen = HashSet::new();
        let layers = incoming
            .into_iter()
            .filter(|l| !l.name.is_empty() && seen.insert(l.name.clone()))
            .collect();
        Self { layers }
    }

    /// Push every initially-hidden layer to `surface`. Returns how many were applied.
    pub fn sync(&self, surface: &mut dyn DrawingSurface) -> usize {
        let mut applied = 0;
        for layer in self.layers.iter().filter(|l| !l.visible) {
            if surface.set_layer_visible(&layer.name, false) {
                applied += 1;
            } else {
                tracing::warn!(layer = %layer.name, "layer has no elements in drawing");
            }
        }
        applied
    }

    /// Set `name` visible or hidden on both the registry and `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError::UnknownLayer`] when the registry has no such layer.
    pub fn toggle(&mut self, name: &str, visible: bool, surface: &mut dyn DrawingSurface) -> Result<(), ViewportError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| ViewportError::UnknownLayer(name.to_owned()))?;
        layer.visible = visible;
        if !surface.set_layer_visible(name, visible) {
            tracing::warn!(layer = %name, "layer has no elements in drawing");
        }
        tracing::debug!(layer = %name, visible, "layer toggled");
        Ok(())
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
