//! Atmosphere catalog.
//!
//! An atmosphere is a named list of layers. The engine looks atmospheres up by
//! id; a UI enumerates them (in declaration order) to build its picker.

/// Id of the reserved empty atmosphere.
pub const SILENCE: &str = "silence";

/// One layer of an atmosphere.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    /// Layer kind, resolved through the `LayerRegistry`.
    pub kind: String,
    /// Layer volume in `[0, 1]`.
    pub volume: f32,
    /// Base period of scheduled one-shots, in milliseconds.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub interval_ms: Option<u64>,
}

impl LayerDescriptor {
    /// A continuous layer.
    pub fn bed(kind: impl Into<String>, volume: f32) -> Self {
        Self {
            kind: kind.into(),
            volume,
            interval_ms: None,
        }
    }

    /// A layer of one-shots fired roughly every `interval_ms`.
    pub fn scheduled(kind: impl Into<String>, volume: f32, interval_ms: u64) -> Self {
        Self {
            kind: kind.into(),
            volume,
            interval_ms: Some(interval_ms),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphereDefinition {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub layers: Vec<LayerDescriptor>,
}

impl AtmosphereDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            description: description.into(),
            layers: Vec::new(),
        }
    }

    pub fn layer(mut self, layer: LayerDescriptor) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn is_silence(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Ordered set of atmospheres.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    atmospheres: Vec<AtmosphereDefinition>,
}

impl Catalog {
    /// Catalog holding only the silence entry.
    pub fn new() -> Self {
        Self {
            atmospheres: vec![AtmosphereDefinition::new(
                SILENCE,
                "Silence",
                "🔇",
                "Pure focus, no distractions",
            )],
        }
    }

    /// The stock soundscapes.
    pub fn builtin() -> Self {
        Self::new()
            .with(
                AtmosphereDefinition::new(
                    "rainy-study",
                    "Rainy Study",
                    "🌧️",
                    "Gentle rain on windows",
                )
                .layer(LayerDescriptor::bed("rain", 0.7))
                .layer(LayerDescriptor::scheduled("thunder", 0.2, 15_000)),
            )
            .with(
                AtmosphereDefinition::new("cafe", "Café Corner", "☕", "Cozy coffee shop ambiance")
                    .layer(LayerDescriptor::bed("cafe-murmur", 0.5))
                    .layer(LayerDescriptor::scheduled("espresso", 0.15, 8_000)),
            )
            .with(
                AtmosphereDefinition::new("ocean", "Ocean Dawn", "🌊", "Waves on a peaceful shore")
                    .layer(LayerDescriptor::bed("waves", 0.6))
                    .layer(LayerDescriptor::scheduled("seagulls", 0.1, 12_000)),
            )
            .with(
                AtmosphereDefinition::new(
                    "forest",
                    "Forest Morning",
                    "🌲",
                    "Birds and gentle breeze",
                )
                .layer(LayerDescriptor::bed("wind", 0.3))
                .layer(LayerDescriptor::scheduled("birds", 0.4, 4_000)),
            )
            .with(
                AtmosphereDefinition::new("fireplace", "Fireplace", "🔥", "Crackling fire warmth")
                    .layer(LayerDescriptor::bed("fire-crackle", 0.6)),
            )
            .with(
                AtmosphereDefinition::new(
                    "night-rain",
                    "Night Rain",
                    "🌙",
                    "Heavy rain and distant thunder",
                )
                .layer(LayerDescriptor::bed("heavy-rain", 0.8))
                .layer(LayerDescriptor::scheduled("thunder", 0.4, 20_000))
                .layer(LayerDescriptor::bed("wind", 0.2)),
            )
    }

    /// Add an atmosphere, replacing any existing entry with the same id.
    pub fn with(mut self, atmosphere: AtmosphereDefinition) -> Self {
        match self.atmospheres.iter_mut().find(|a| a.id == atmosphere.id) {
            Some(existing) => *existing = atmosphere,
            None => self.atmospheres.push(atmosphere),
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<&AtmosphereDefinition> {
        self.atmospheres.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AtmosphereDefinition> {
        self.atmospheres.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.atmospheres.iter().map(|a| a.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.atmospheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atmospheres.is_empty()
    }

    /// Catalog as pretty-printed JSON, for UIs.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
