use serde::{Deserialize, Serialize};
use std::fmt;

/// Exam subject domains scored by Saber 11°, plus the aggregate global score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeArea {
    #[serde(alias = "matematicas")]
    Mathematics,
    #[serde(alias = "ciencias_naturales")]
    NaturalSciences,
    #[serde(alias = "ciencias_sociales")]
    SocialSciences,
    #[serde(alias = "lectura_critica")]
    CriticalReading,
    #[serde(alias = "ingles")]
    English,
    #[serde(alias = "puntaje_global")]
    Global,
}

const ENGLISH_LEVEL_LABELS: [&str; 5] = ["A-", "A1", "A2", "B1", "B+"];

impl KnowledgeArea {
    pub const ALL: [KnowledgeArea; 6] = [
        KnowledgeArea::Mathematics,
        KnowledgeArea::NaturalSciences,
        KnowledgeArea::SocialSciences,
        KnowledgeArea::CriticalReading,
        KnowledgeArea::English,
        KnowledgeArea::Global,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Mathematics => "mathematics",
            Self::NaturalSciences => "natural_sciences",
            Self::SocialSciences => "social_sciences",
            Self::CriticalReading => "critical_reading",
            Self::English => "english",
            Self::Global => "global",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mathematics => "Matemáticas",
            Self::NaturalSciences => "Ciencias naturales",
            Self::SocialSciences => "Sociales y ciudadanas",
            Self::CriticalReading => "Lectura crítica",
            Self::English => "Inglés",
            Self::Global => "Puntaje global",
        }
    }

    /// Resolves both the English slugs and the dashboard's Spanish identifiers.
    pub fn from_slug(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mathematics" | "matematicas" => Some(Self::Mathematics),
            "natural_sciences" | "ciencias_naturales" => Some(Self::NaturalSciences),
            "social_sciences" | "ciencias_sociales" => Some(Self::SocialSciences),
            "critical_reading" | "lectura_critica" => Some(Self::CriticalReading),
            "english" | "ingles" => Some(Self::English),
            "global" | "puntaje_global" => Some(Self::Global),
            _ => None,
        }
    }

    /// Highest performance level reported for the area.
    pub const fn max_level(self) -> u8 {
        match self {
            Self::English | Self::Global => 5,
            _ => 4,
        }
    }

    pub fn level_labels(self) -> Vec<String> {
        match self {
            Self::English => ENGLISH_LEVEL_LABELS.iter().map(|s| s.to_string()).collect(),
            other => (1..=other.max_level()).map(|n| n.to_string()).collect(),
        }
    }

    pub fn level_label(self, level: u8) -> Option<String> {
        if level == 0 || level > self.max_level() {
            return None;
        }
        self.level_labels().into_iter().nth(usize::from(level) - 1)
    }
}

impl fmt::Display for KnowledgeArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
