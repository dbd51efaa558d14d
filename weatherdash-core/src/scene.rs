//! Decorative background: which particles to scatter and which accent to use.

use rand::{Rng, RngExt};

const HILL_STATIONS: [&str; 5] = ["shimla", "manali", "dharamshala", "mussoorie", "nainital"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Particle {
    Rain,
    Snow,
    Haze,
    Sparkle,
    Cloud,
}

impl Particle {
    pub fn glyph(self) -> char {
        match self {
            Particle::Rain => '╎',
            Particle::Snow => '❄',
            Particle::Haze => '〰',
            Particle::Sparkle => '✦',
            Particle::Cloud => '☁',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    pub particle: Particle,
    pub count: usize,
}

/// City-themed accent colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Ocean,
    Sunset,
    Garden,
    Coast,
    Violet,
    Indigo,
    Teal,
    Rose,
    Beach,
    Backwater,
    Sky,
}

impl Accent {
    pub fn for_location(location: &str) -> Self {
        let l = location.to_lowercase();
        let has = |needle: &str| l.contains(needle);

        if has("mumbai") {
            Accent::Ocean
        } else if has("delhi") {
            Accent::Sunset
        } else if has("bangalore") || has("bengaluru") {
            Accent::Garden
        } else if has("chennai") {
            Accent::Coast
        } else if has("kolkata") {
            Accent::Violet
        } else if has("hyderabad") {
            Accent::Indigo
        } else if has("pune") {
            Accent::Teal
        } else if has("jaipur") {
            Accent::Rose
        } else if has("goa") {
            Accent::Beach
        } else if has("kerala") || has("kochi") {
            Accent::Backwater
        } else {
            Accent::Sky
        }
    }

    /// ANSI 256-colour foreground code.
    pub fn ansi(self) -> u8 {
        match self {
            Accent::Ocean => 33,
            Accent::Sunset => 203,
            Accent::Garden => 35,
            Accent::Coast => 214,
            Accent::Violet => 135,
            Accent::Indigo => 63,
            Accent::Teal => 37,
            Accent::Rose => 205,
            Accent::Beach => 45,
            Accent::Backwater => 29,
            Accent::Sky => 75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub layers: Vec<Layer>,
    pub accent: Accent,
}

impl Scene {
    /// Several layers can apply at once ("sunny with clouds").
    pub fn for_conditions(condition: &str, location: &str) -> Self {
        let c = condition.to_lowercase();
        let l = location.to_lowercase();
        let mut layers = Vec::new();

        if c.contains("rain") || c.contains("storm") {
            layers.push(Layer { particle: Particle::Rain, count: 120 });
        }
        // Snow only ever falls on the hills.
        if c.contains("snow") && HILL_STATIONS.iter().any(|h| l.contains(h)) {
            layers.push(Layer { particle: Particle::Snow, count: 60 });
        }
        if c.contains("hazy") || c.contains("humid") {
            layers.push(Layer { particle: Particle::Haze, count: 15 });
        }
        if c.contains("sun") || c.contains("clear") {
            layers.push(Layer { particle: Particle::Sparkle, count: 25 });
        }
        if c.contains("cloud") {
            layers.push(Layer { particle: Particle::Cloud, count: 8 });
        }

        Self { layers, accent: Accent::for_location(location) }
    }

    /// One row of `width` cells with particles dropped at random columns.
    /// Counts are scaled down to the row width.
    pub fn strip<R: Rng + ?Sized>(&self, width: usize, rng: &mut R) -> String {
        if width == 0 {
            return String::new();
        }
        let mut cells = vec![' '; width];

        for layer in &self.layers {
            let n = (layer.count * width / 240).max(1);
            for _ in 0..n {
                cells[rng.random_range(0..width)] = layer.particle.glyph();
            }
        }

        cells.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn particles(scene: &Scene) -> Vec<Particle> {
        scene.layers.iter().map(|l| l.particle).collect()
    }

    #[test]
    fn rain_and_storm_share_the_rain_layer() {
        let scene = Scene::for_conditions("Thunderstorm", "Delhi");
        assert_eq!(scene.layers, vec![Layer { particle: Particle::Rain, count: 120 }]);
    }

    #[test]
    fn snow_only_on_hill_stations() {
        assert_eq!(particles(&Scene::for_conditions("light snow", "Shimla")), [Particle::Snow]);
        assert!(Scene::for_conditions("light snow", "Delhi").layers.is_empty());
    }

    #[test]
    fn layers_stack() {
        let scene = Scene::for_conditions("sunny, partly cloudy", "Pune");
        assert_eq!(particles(&scene), [Particle::Sparkle, Particle::Cloud]);
        assert_eq!(scene.accent, Accent::Teal);
    }

    #[test]
    fn accents_by_city() {
        assert_eq!(Accent::for_location("Navi Mumbai"), Accent::Ocean);
        assert_eq!(Accent::for_location("Bengaluru"), Accent::Garden);
        assert_eq!(Accent::for_location("Kochi"), Accent::Backwater);
        assert_eq!(Accent::for_location("Agra"), Accent::Sky);
    }

    #[test]
    fn strip_has_requested_width() {
        let mut rng = StdRng::seed_from_u64(4);
        let scene = Scene::for_conditions("rain", "Mumbai");

        let strip = scene.strip(60, &mut rng);
        assert_eq!(strip.chars().count(), 60);
        assert!(strip.contains(Particle::Rain.glyph()));

        assert_eq!(Scene::for_conditions("", "").strip(10, &mut rng), " ".repeat(10));
        assert_eq!(scene.strip(0, &mut rng), "");
    }
}
