use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};

/// Star colour palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorScheme {
    Purple,
    Blue,
    Green,
    Amber,
    Red,
}

/// User-facing configuration. Every field maps onto a force-model or
/// orbital coefficient and is read fresh on each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StarfieldConfig {
    /// Multiplier on the area-based star count.
    pub star_density: f32,
    pub color_scheme: ColorScheme,
    /// Multiplier on star radius.
    pub star_size: f32,
    /// Strength of black hole and sun gravity.
    pub gravitational_pull: f32,
    /// Strength of the tangential swirl around the content ring.
    pub flow_strength: f32,
    /// Pointer repulsion radius in pixels.
    pub mouse_effect_radius: f32,
    /// CSS colour of the debug pointer circle.
    pub mouse_effect_color: String,
    /// Multiplier on planet orbit speed.
    pub employee_orbit_speed: f32,
    /// Max distance in pixels for a connection line.
    pub line_connection_distance: f32,
    pub line_opacity: f32,
    /// Speed ceiling for inactive stars (pixels per normalized frame).
    pub max_velocity: f32,
    /// Scale on star integration.
    pub animation_speed: f32,
    pub is_debug_mode: bool,
    pub enable_flow_effect: bool,
    pub enable_black_holes: bool,
    pub enable_mouse_interaction: bool,
    pub enable_employee_stars: bool,
    pub enable_connections: bool,
    pub black_hole_size: f32,
    /// Angular speed multiplier for accretion particles.
    pub particle_speed: f32,
    /// Halves density while a hero section is on screen.
    pub hero_mode: bool,
    /// Score star/planet collisions.
    pub game_mode: bool,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            star_density: 1.0,
            color_scheme: ColorScheme::Purple,
            star_size: 1.0,
            gravitational_pull: 1.0,
            flow_strength: 1.0,
            mouse_effect_radius: 250.0,
            mouse_effect_color: "rgba(255, 255, 255, 0.1)".to_string(),
            employee_orbit_speed: 1.0,
            line_connection_distance: 100.0,
            line_opacity: 0.15,
            max_velocity: 0.5,
            animation_speed: 1.0,
            is_debug_mode: false,
            enable_flow_effect: true,
            enable_black_holes: true,
            enable_mouse_interaction: true,
            enable_employee_stars: true,
            enable_connections: true,
            black_hole_size: 1.0,
            particle_speed: 1.0,
            hero_mode: false,
            game_mode: false,
        }
    }
}

impl StarfieldConfig {
    /// Parse a full or partial config from JSON, filling gaps with defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Density after hero-mode adjustment.
    pub fn effective_density(&self) -> f32 {
        if self.hero_mode {
            self.star_density * 0.5
        } else {
            self.star_density
        }
    }

    /// Reject non-finite or negative numeric settings.
    pub fn validate(&self) -> EngineResult<()> {
        let numeric = [
            ("starDensity", self.star_density),
            ("starSize", self.star_size),
            ("gravitationalPull", self.gravitational_pull),
            ("flowStrength", self.flow_strength),
            ("mouseEffectRadius", self.mouse_effect_radius),
            ("employeeOrbitSpeed", self.employee_orbit_speed),
            ("lineConnectionDistance", self.line_connection_distance),
            ("lineOpacity", self.line_opacity),
            ("maxVelocity", self.max_velocity),
            ("animationSpeed", self.animation_speed),
            ("blackHoleSize", self.black_hole_size),
            ("particleSpeed", self.particle_speed),
        ];
        for (key, value) in numeric {
            if !value.is_finite() {
                return Err(EngineError::InvalidSetting {
                    key: key.to_string(),
                    reason: "must be a finite number".to_string(),
                });
            }
            if value < 0.0 {
                return Err(EngineError::InvalidSetting {
                    key: key.to_string(),
                    reason: format!("must not be negative (got {})", value),
                });
            }
        }
        Ok(())
    }

    /// Set one field by its camelCase key. On any failure `self` is unchanged.
    pub fn apply_setting(&mut self, key: &str, value: &Value) -> EngineResult<()> {
        let mut map = self.to_map()?;
        if !map.contains_key(key) {
            return Err(EngineError::UnknownSetting(key.to_string()));
        }
        map.insert(key.to_string(), value.clone());
        self.replace_from_map(map, key)
    }

    /// Merge a partial JSON object into the config. Unknown keys are rejected
    /// and nothing is applied unless every key is valid.
    pub fn merge(&mut self, partial: &Value) -> EngineResult<Vec<String>> {
        let Value::Object(patch) = partial else {
            return Err(EngineError::InvalidSetting {
                key: "<config>".to_string(),
                reason: "partial config must be a JSON object".to_string(),
            });
        };
        let mut map = self.to_map()?;
        let mut changed = Vec::with_capacity(patch.len());
        for (key, value) in patch {
            if !map.contains_key(key) {
                return Err(EngineError::UnknownSetting(key.clone()));
            }
            map.insert(key.clone(), value.clone());
            changed.push(key.clone());
        }
        let label = changed.join(",");
        self.replace_from_map(map, &label)?;
        Ok(changed)
    }

    fn to_map(&self) -> EngineResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(EngineError::NotReady("config did not serialize to an object")),
        }
    }

    fn replace_from_map(&mut self, map: Map<String, Value>, key: &str) -> EngineResult<()> {
        let candidate: Self = serde_json::from_value(Value::Object(map)).map_err(|e| {
            EngineError::InvalidSetting {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })?;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}
