use crate::api::types::{PlanetId, SunId};
use crate::components::black_hole::BlackHole;
use crate::components::planet::Planet;
use crate::components::star::Star;
use crate::components::sun::Sun;

/// Flat-Vec storage for every simulated body.
/// Plain data: systems borrow the fields they need directly.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    pub stars: Vec<Star>,
    pub black_holes: Vec<BlackHole>,
    pub suns: Vec<Sun>,
    pub planets: Vec<Planet>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with star capacity reserved up front.
    pub fn with_capacity(stars: usize) -> Self {
        Self {
            stars: Vec::with_capacity(stars),
            ..Self::default()
        }
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    /// Bodies of every kind.
    pub fn len(&self) -> usize {
        self.stars.len() + self.black_holes.len() + self.suns.len() + self.planets.len()
    }

    /// Whether there is nothing to simulate.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sun(&self, id: SunId) -> Option<&Sun> {
        self.suns.iter().find(|s| s.id == id)
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// Planets orbiting the given sun.
    pub fn planets_of(&self, id: SunId) -> impl Iterator<Item = &Planet> {
        self.planets.iter().filter(move |p| p.parent == id)
    }

    /// Clear all entities.
    pub fn clear(&mut self) {
        self.stars.clear();
        self.black_holes.clear();
        self.suns.clear();
        self.planets.clear();
    }
}
