use super::color::Rgba;

/// A sun to place in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SunSeed {
    pub name: String,
    pub color: Rgba,
}

/// A planet to place around `sun` (index into `SceneSeed::suns`).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetSeed {
    pub name: String,
    pub sun: usize,
    pub mass: f32,
    pub color: Rgba,
}

/// Catalogue of orbital bodies. Stars and black holes are generated;
/// suns and planets come from here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneSeed {
    pub suns: Vec<SunSeed>,
    pub planets: Vec<PlanetSeed>,
}

impl SceneSeed {
    /// Four focus areas with a handful of projects each.
    pub fn portfolio() -> Self {
        let suns = [
            ("Platform", 0xfbbf24),
            ("Product", 0x60a5fa),
            ("Research", 0xc084fc),
            ("Community", 0x34d399),
        ]
        .into_iter()
        .map(|(name, hex)| SunSeed { name: name.to_string(), color: Rgba::hex(hex) })
        .collect();

        let planets = [
            ("Scheduler", 0, 8.0),
            ("Storage", 0, 5.0),
            ("Telemetry", 0, 3.0),
            ("Dashboard", 1, 6.0),
            ("Mobile", 1, 4.0),
            ("Simulation", 2, 7.0),
            ("Visualization", 2, 2.0),
            ("Docs", 3, 2.0),
            ("Meetups", 3, 1.0),
            ("Mentoring", 3, 1.5),
        ]
        .into_iter()
        .map(|(name, sun, mass)| PlanetSeed {
            name: name.to_string(),
            sun,
            mass,
            color: Rgba::hex(0xe5e7eb),
        })
        .collect();

        Self { suns, planets }
    }

    /// Drop planets that point at a sun index that does not exist.
    pub fn sanitized(mut self) -> Self {
        let n = self.suns.len();
        self.planets.retain(|p| p.sun < n);
        self
    }
}
