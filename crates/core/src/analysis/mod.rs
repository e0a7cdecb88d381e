use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{DreamCanvasError, DreamRecord};

const INTENSITY_BASE: f32 = 0.2;
const INTENSITY_PER_DREAM: f32 = 0.02;
const COMPLEXITY_BASE: f32 = 0.1;
const COMPLEXITY_PER_DREAM: f32 = 0.015;
const COMPLEXITY_CEILING: f32 = 0.8;

const FALLBACK_PALETTE: [Rgb; 3] = [
    Rgb::new(0xE8, 0xF4, 0xFD),
    Rgb::new(0xB8, 0xE6, 0xFF),
    Rgb::new(0x87, 0xCE, 0xEB),
];
const MINIMAL_PALETTE: [Rgb; 3] = [
    Rgb::new(0xF0, 0xF8, 0xFF),
    Rgb::new(0xE6, 0xF3, 0xFF),
    Rgb::new(0xCC, 0xE7, 0xFF),
];
const FLOWING_PALETTE: [Rgb; 4] = [
    Rgb::new(0xE8, 0xF4, 0xFD),
    Rgb::new(0xB8, 0xE6, 0xFF),
    Rgb::new(0x87, 0xCE, 0xEB),
    Rgb::new(0x46, 0x82, 0xB4),
];
const COSMIC_PALETTE: [Rgb; 4] = [
    Rgb::new(0x19, 0x19, 0x70),
    Rgb::new(0x41, 0x69, 0xE1),
    Rgb::new(0x87, 0xCE, 0xEB),
    Rgb::new(0xF0, 0xF8, 0xFF),
];
const DEEP_COSMIC_PALETTE: [Rgb; 5] = [
    Rgb::new(0x00, 0x00, 0x80),
    Rgb::new(0x41, 0x69, 0xE1),
    Rgb::new(0x87, 0xCE, 0xEB),
    Rgb::new(0xF0, 0xF8, 0xFF),
    Rgb::new(0xFF, 0xD7, 0x00),
];
const NIGHT_SKY_PALETTE: [Rgb; 5] = [
    Rgb::new(0x19, 0x19, 0x70),
    Rgb::new(0x41, 0x69, 0xE1),
    Rgb::new(0x87, 0xCE, 0xEB),
    Rgb::new(0xF0, 0xF8, 0xFF),
    Rgb::new(0xFF, 0xD7, 0x00),
];
const OCEAN_PALETTE: [Rgb; 4] = [
    Rgb::new(0x00, 0x1F, 0x3F),
    Rgb::new(0x00, 0x74, 0xD9),
    Rgb::new(0x7F, 0xDB, 0xFF),
    Rgb::new(0xE6, 0xF3, 0xFF),
];
const FIRE_PALETTE: [Rgb; 4] = [
    Rgb::new(0xFF, 0x45, 0x00),
    Rgb::new(0xFF, 0x63, 0x47),
    Rgb::new(0xFF, 0xD7, 0x00),
    Rgb::new(0xFF, 0xF8, 0xDC),
];
const FOREST_PALETTE: [Rgb; 4] = [
    Rgb::new(0x22, 0x8B, 0x22),
    Rgb::new(0x32, 0xCD, 0x32),
    Rgb::new(0x90, 0xEE, 0x90),
    Rgb::new(0xF0, 0xFF, 0xF0),
];

static WATER_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(water|ocean|sea|river|lake|rain|swimming|drowning)\b")
        .expect("water keyword pattern is valid")
});
static FIRE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(fire|flame|burning|heat|light|sun|bright)\b")
        .expect("fire keyword pattern is valid")
});
static NATURE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(tree|forest|mountain|earth|ground|plant|flower|animal)\b")
        .expect("nature keyword pattern is valid")
});
static SPACE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(space|star|moon|planet|sky|cosmic|universe|galaxy)\b")
        .expect("space keyword pattern is valid")
});
static FLYING_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(flying|flight|soaring|floating|air|wind)\b")
        .expect("flying keyword pattern is valid")
});

/// An 8-bit RGB color, serialized as a `#RRGGBB` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = DreamCanvasError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(DreamCanvasError::msg(format!(
                "expected a #RRGGBB color, got `{value}`"
            )));
        }

        let channel = |range| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| {
                DreamCanvasError::msg(format!("expected a #RRGGBB color, got `{value}`"))
            })
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// The overall visual direction an art configuration commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtStyle {
    Minimal,
    Flowing,
    Cosmic,
    Forest,
    Ocean,
    Fire,
}

impl fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtStyle::Minimal => "minimal",
            ArtStyle::Flowing => "flowing",
            ArtStyle::Cosmic => "cosmic",
            ArtStyle::Forest => "forest",
            ArtStyle::Ocean => "ocean",
            ArtStyle::Fire => "fire",
        };
        f.write_str(name)
    }
}

/// Which of the five pattern families the renderer should paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFlags {
    pub circles: bool,
    pub lines: bool,
    pub spirals: bool,
    pub waves: bool,
    pub stars: bool,
}

/// Immutable art configuration derived from one dream snapshot.
///
/// `colors` always holds at least three entries and `intensity`/`complexity`
/// stay inside [0, 1]; the renderer relies on both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtConfig {
    pub style: ArtStyle,
    pub colors: Vec<Rgb>,
    pub patterns: PatternFlags,
    pub intensity: f32,
    pub complexity: f32,
}

impl ArtConfig {
    /// Configuration used when the user has no dreams yet. The renderer
    /// still gets a valid palette and one enabled pattern family.
    pub fn fallback() -> Self {
        Self {
            style: ArtStyle::Minimal,
            colors: FALLBACK_PALETTE.to_vec(),
            patterns: PatternFlags {
                circles: true,
                lines: false,
                spirals: false,
                waves: false,
                stars: false,
            },
            intensity: 0.3,
            complexity: 0.2,
        }
    }
}

/// Which keyword families matched the combined dream text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeMatches {
    pub water: bool,
    pub fire: bool,
    pub nature: bool,
    pub space: bool,
    pub flying: bool,
}

impl ThemeMatches {
    /// Tests the five whole-word keyword families against `text`.
    /// Matching is case-insensitive via a lowercase pass.
    pub fn detect(text: &str) -> Self {
        let text = text.to_lowercase();
        Self {
            water: WATER_WORDS.is_match(&text),
            fire: FIRE_WORDS.is_match(&text),
            nature: NATURE_WORDS.is_match(&text),
            space: SPACE_WORDS.is_match(&text),
            flying: FLYING_WORDS.is_match(&text),
        }
    }
}

/// Joins every record's content and summary into one searchable string.
pub fn combined_text(dreams: &[DreamRecord]) -> String {
    let mut text = String::new();
    for dream in dreams {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&dream.dream_content);
        text.push(' ');
        text.push_str(dream.summary.as_deref().unwrap_or(""));
    }
    text
}

/// Derives an [`ArtConfig`] from a snapshot of dream records.
///
/// Pure and fully deterministic: the same snapshot always yields an
/// identical configuration. The dream count picks a base style and
/// palette, an explicit content theme overrides it (water beats fire
/// beats nature beats space/flying), and the two scalars grow linearly
/// with the count up to fixed caps.
pub fn analyze(dreams: &[DreamRecord]) -> ArtConfig {
    if dreams.is_empty() {
        return ArtConfig::fallback();
    }

    let count = dreams.len();
    let themes = ThemeMatches::detect(&combined_text(dreams));

    let (mut style, mut colors) = count_profile(count);
    if themes.water {
        style = ArtStyle::Ocean;
        colors = OCEAN_PALETTE.to_vec();
    } else if themes.fire {
        style = ArtStyle::Fire;
        colors = FIRE_PALETTE.to_vec();
    } else if themes.nature {
        style = ArtStyle::Forest;
        colors = FOREST_PALETTE.to_vec();
    } else if themes.space || themes.flying {
        style = ArtStyle::Cosmic;
        colors = NIGHT_SKY_PALETTE.to_vec();
    }

    let patterns = PatternFlags {
        circles: count > 0,
        lines: count > 3,
        spirals: count > 8,
        waves: themes.water || count > 12,
        stars: themes.space || count > 20,
    };

    let intensity = (INTENSITY_BASE + count as f32 * INTENSITY_PER_DREAM).min(1.0);
    let complexity = (COMPLEXITY_BASE + count as f32 * COMPLEXITY_PER_DREAM).min(COMPLEXITY_CEILING);

    ArtConfig {
        style,
        colors,
        patterns,
        intensity,
        complexity,
    }
}

fn count_profile(count: usize) -> (ArtStyle, Vec<Rgb>) {
    if count < 5 {
        (ArtStyle::Minimal, MINIMAL_PALETTE.to_vec())
    } else if count < 15 {
        (ArtStyle::Flowing, FLOWING_PALETTE.to_vec())
    } else if count < 30 {
        (ArtStyle::Cosmic, COSMIC_PALETTE.to_vec())
    } else {
        (ArtStyle::Cosmic, DEEP_COSMIC_PALETTE.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dream(content: &str) -> DreamRecord {
        DreamRecord {
            id: "d".to_string(),
            created_at: "2025-11-01T06:00:00Z".to_string(),
            dream_content: content.to_string(),
            summary: None,
        }
    }

    fn plain_dreams(count: usize) -> Vec<DreamRecord> {
        (0..count).map(|i| dream(&format!("entry {i}"))).collect()
    }

    #[test]
    fn empty_snapshot_yields_exact_fallback() {
        let config = analyze(&[]);

        assert_eq!(config.style, ArtStyle::Minimal);
        assert_eq!(config.colors.len(), 3);
        assert_eq!(config.colors[0], Rgb::new(0xE8, 0xF4, 0xFD));
        assert!(config.patterns.circles);
        assert!(!config.patterns.lines);
        assert!(!config.patterns.spirals);
        assert!(!config.patterns.waves);
        assert!(!config.patterns.stars);
        assert_eq!(config.intensity, 0.3);
        assert_eq!(config.complexity, 0.2);
    }

    #[test]
    fn intensity_and_complexity_follow_the_count_formulas() {
        for count in 1..60 {
            let config = analyze(&plain_dreams(count));
            let expected_intensity = (0.2 + count as f32 * 0.02).min(1.0);
            let expected_complexity = (0.1 + count as f32 * 0.015).min(0.8);
            assert_eq!(config.intensity, expected_intensity, "count {count}");
            assert_eq!(config.complexity, expected_complexity, "count {count}");
        }
    }

    #[test]
    fn intensity_and_complexity_are_monotonic() {
        let mut previous = analyze(&plain_dreams(1));
        for count in 2..60 {
            let config = analyze(&plain_dreams(count));
            assert!(config.intensity >= previous.intensity);
            assert!(config.complexity >= previous.complexity);
            previous = config;
        }
    }

    #[test]
    fn water_beats_fire_in_theme_precedence() {
        let dreams = vec![
            dream("the ocean was on fire"),
            dream("burning water everywhere"),
        ];
        let config = analyze(&dreams);

        assert_eq!(config.style, ArtStyle::Ocean);
        assert_eq!(config.colors[0], Rgb::new(0x00, 0x1F, 0x3F));
    }

    #[test]
    fn pattern_flags_follow_count_thresholds() {
        for count in 1..35 {
            let config = analyze(&plain_dreams(count));
            assert_eq!(config.patterns.lines, count > 3, "count {count}");
            assert_eq!(config.patterns.spirals, count > 8, "count {count}");
            assert_eq!(config.patterns.waves, count > 12, "count {count}");
            assert_eq!(config.patterns.stars, count > 20, "count {count}");
        }
    }

    #[test]
    fn waves_and_stars_also_switch_on_by_theme() {
        let watery = analyze(&[dream("swimming in a lake")]);
        assert!(watery.patterns.waves);
        assert!(!watery.patterns.stars);

        let spacey = analyze(&[dream("walking on the moon")]);
        assert!(spacey.patterns.stars);
        assert!(!spacey.patterns.waves);
    }

    #[test]
    fn analyze_is_idempotent() {
        let dreams = vec![dream("a forest of glass trees"), dream("soaring over hills")];
        let first = analyze(&dreams);
        let second = analyze(&dreams);
        assert_eq!(first, second);
    }

    #[test]
    fn plain_records_read_as_flowing_with_threshold_patterns() {
        let config = analyze(&plain_dreams(7));
        assert_eq!(config.style, ArtStyle::Flowing);
        assert!(config.patterns.circles);
        assert!(config.patterns.lines);
        assert!(!config.patterns.spirals);
        assert!(!config.patterns.waves);
        assert!(!config.patterns.stars);

        let config = analyze(&plain_dreams(10));
        assert_eq!(config.style, ArtStyle::Flowing);
        assert!(config.patterns.spirals, "spirals switch on above eight");
        assert!(!config.patterns.waves);
        assert!(!config.patterns.stars);
    }

    #[test]
    fn ocean_keyword_overrides_the_count_base() {
        let mut dreams = plain_dreams(5);
        dreams.push(dream("I drifted across a calm ocean"));
        let config = analyze(&dreams);

        assert_eq!(config.style, ArtStyle::Ocean);
        assert!(config.patterns.waves, "waves follow the water theme");
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let themes = ThemeMatches::detect("a firefly near the treehouse");
        assert!(!themes.fire);
        assert!(!themes.nature);

        let themes = ThemeMatches::detect("Rain on the Mountain");
        assert!(themes.water);
        assert!(themes.nature);
    }

    #[test]
    fn summaries_count_toward_theme_detection() {
        let mut record = dream("nothing notable");
        record.summary = Some("a galaxy of doors".to_string());
        let config = analyze(&[record]);

        assert_eq!(config.style, ArtStyle::Cosmic);
        assert!(config.patterns.stars);
    }

    #[test]
    fn thirty_records_pick_the_five_color_palette() {
        let config = analyze(&plain_dreams(30));
        assert_eq!(config.style, ArtStyle::Cosmic);
        assert_eq!(config.colors.len(), 5);
        assert_eq!(config.colors[4], Rgb::new(0xFF, 0xD7, 0x00));
    }

    #[test]
    fn every_palette_has_at_least_three_colors() {
        for count in [0, 1, 4, 5, 14, 15, 29, 30, 50] {
            let config = analyze(&plain_dreams(count));
            assert!(config.colors.len() >= 3, "count {count}");
            assert!(config.colors.len() <= 5, "count {count}");
        }
    }

    #[test]
    fn rgb_round_trips_through_hex() {
        let color = Rgb::new(0x00, 0x74, 0xD9);
        assert_eq!(color.to_string(), "#0074D9");
        assert_eq!("#0074D9".parse::<Rgb>().unwrap(), color);
        assert_eq!("0074d9".parse::<Rgb>().unwrap(), color);
        assert!("#074D9".parse::<Rgb>().is_err());
        assert!("#GG74D9".parse::<Rgb>().is_err());
    }

    #[test]
    fn art_config_serializes_colors_as_hex() {
        let json = serde_json::to_string(&ArtConfig::fallback()).unwrap();
        assert!(json.contains(r##""#E8F4FD""##));
        assert!(json.contains(r#""style":"minimal""#));

        let back: ArtConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ArtConfig::fallback());
    }
}
