use glam::Vec2;

/// Physics coefficients that are not exposed as user settings.
/// Distances on the star side are pixels; on the sun side they are
/// normalized (0..1) viewport units.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsTuning {
    // -- Frame timing --
    /// Milliseconds in one nominal frame; dt is divided by this.
    pub nominal_frame_ms: f32,
    /// Star integration never sees more than this many ms per tick.
    pub max_star_dt_ms: f32,
    /// Sun integration never sees more than this many ms per tick.
    pub max_sun_dt_ms: f32,

    // -- Stars --
    pub active_velocity_multiplier: f32,
    pub damping_active: f32,
    pub damping_inactive: f32,
    /// Spring constant pulling a star back to its home position.
    pub home_spring: f32,
    /// Stars fall back to inactive this long after their last impulse.
    pub deactivation_ms: f64,
    /// Scale applied to velocity when advancing position.
    pub position_scale: f32,
    pub base_star_size: f32,
    /// Stars per square pixel at density 1.0.
    pub stars_per_px2: f32,
    pub max_stars: usize,

    // -- Pointer --
    pub pointer_repel_force: f32,
    /// Fraction of pointer velocity blended into nearby stars.
    pub pointer_velocity_blend: f32,
    pub click_radius: f32,
    pub click_force: f32,
    pub click_force_multiplier: f32,

    // -- Black holes --
    /// Influence radius as a multiple of the hole's radius.
    pub black_hole_influence: f32,
    pub black_hole_force: f32,
    pub black_hole_min_dist_sq: f32,
    pub accretion_particles: usize,
    pub accretion_base_speed: f32,

    // -- Flow --
    /// Content ring radius as a fraction of the viewport's min dimension.
    pub flow_content_radius: f32,
    /// Half-width of the flow band, same units.
    pub flow_band: f32,
    pub flow_force: f32,

    // -- Sun gravity on stars --
    /// Annulus inner/outer radius as a fraction of the min dimension.
    pub sun_gravity_inner: f32,
    pub sun_gravity_outer: f32,
    pub sun_gravity_force: f32,

    // -- Suns --
    pub sun_padding: f32,
    pub activation_delay_ms: (f64, f64),
    pub activation_trigger_radius: f32,
    pub drift_amplitude: (f32, f32),
    pub drift_speed: (f32, f32),
    /// Fraction of the remaining distance to the drift target covered per tick.
    pub drift_blend: f32,
    pub click_repulsion_radius: f32,
    pub click_repulsion_force: f32,
    pub max_click_repulsion: f32,
    pub click_repulsion_decay: f32,
    pub click_repulsion_cutoff: f32,
    pub center: Vec2,
    pub center_repulsion_radius: f32,
    pub center_repulsion_strength: f32,
    pub min_distance_threshold: f32,
    pub propel_threshold: f32,
    pub propel_push: f32,
    /// Ticks the propelling flag stays set after a push.
    pub propel_duration_ticks: u32,
    pub rotation_boost: f32,
    pub max_rotation_speed: f32,
    pub base_rotation_speed: f32,
    pub rotation_decay: f32,
    pub velocity_damping: f32,
    /// Weight of velocity in the position update on top of drift.
    pub velocity_weight: f32,
    /// Sun render size range, fraction of the min dimension.
    pub sun_size_range: (f32, f32),

    // -- Planets --
    pub planet_click_radius: f32,
    pub planet_click_boost: f32,
    pub planet_boost_decay: f32,

    // -- Camera --
    pub camera_smoothing: f32,
    pub camera_convergence: f32,
    pub sun_focus_zoom: f32,
    pub focus_zoom_range: (f32, f32),

    // -- Collisions --
    pub collision_base_distance: f32,
    pub collision_effect_speed: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            nominal_frame_ms: 16.0,
            max_star_dt_ms: 32.0,
            max_sun_dt_ms: 50.0,

            active_velocity_multiplier: 32.0,
            damping_active: 0.985,
            damping_inactive: 0.96,
            home_spring: 0.0005,
            deactivation_ms: 1500.0,
            position_scale: 1.0,
            base_star_size: 1.2,
            stars_per_px2: 0.00015,
            max_stars: 2000,

            pointer_repel_force: 0.2,
            pointer_velocity_blend: 0.02,
            click_radius: 250.0,
            click_force: 12.0,
            click_force_multiplier: 2.5,

            black_hole_influence: 15.0,
            black_hole_force: 3.0,
            black_hole_min_dist_sq: 100.0,
            accretion_particles: 24,
            accretion_base_speed: 0.0015,

            flow_content_radius: 0.3,
            flow_band: 0.15,
            flow_force: 0.002,

            sun_gravity_inner: 0.03,
            sun_gravity_outer: 0.35,
            sun_gravity_force: 0.5,

            sun_padding: 0.12,
            activation_delay_ms: (300.0, 1200.0),
            activation_trigger_radius: 0.25,
            drift_amplitude: (0.015, 0.035),
            drift_speed: (0.00015, 0.0004),
            drift_blend: 0.01,
            click_repulsion_radius: 0.25,
            click_repulsion_force: 0.015,
            max_click_repulsion: 0.08,
            click_repulsion_decay: 0.97,
            click_repulsion_cutoff: 1e-5,
            center: Vec2::new(0.5, 0.5),
            center_repulsion_radius: 0.3,
            center_repulsion_strength: 0.0002,
            min_distance_threshold: 0.001,
            propel_threshold: 0.15,
            propel_push: 0.001,
            propel_duration_ticks: 60,
            rotation_boost: 0.00008,
            max_rotation_speed: 0.0003,
            base_rotation_speed: 0.00005,
            rotation_decay: 0.998,
            velocity_damping: 0.9,
            velocity_weight: 0.3,
            sun_size_range: (0.035, 0.075),

            planet_click_radius: 200.0,
            planet_click_boost: 0.004,
            planet_boost_decay: 0.95,

            camera_smoothing: 0.08,
            camera_convergence: 0.001,
            sun_focus_zoom: 2.5,
            focus_zoom_range: (1.5, 3.5),

            collision_base_distance: 15.0,
            collision_effect_speed: 0.5,
        }
    }
}

impl PhysicsTuning {
    /// Speed ceiling for a star given the configured max velocity.
    pub fn speed_ceiling(&self, max_velocity: f32, active: bool) -> f32 {
        if active {
            max_velocity * self.active_velocity_multiplier
        } else {
            max_velocity
        }
    }

    /// Delta time normalized to nominal frames, capped for stars.
    pub fn star_delta(&self, dt_ms: f32) -> f32 {
        dt_ms.clamp(0.0, self.max_star_dt_ms) / self.nominal_frame_ms
    }
}
