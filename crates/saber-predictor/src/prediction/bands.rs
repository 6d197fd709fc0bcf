use super::area::KnowledgeArea;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Inclusive score range reported for one (area, level) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min_score: u16,
    pub max_score: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ScoreBandError {
    #[error("failed to read score bands: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid score band CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unknown area '{0}' in score bands")]
    UnknownArea(String),
    #[error("level {level} is outside the range of area '{area}'")]
    LevelOutOfRange { area: KnowledgeArea, level: u8 },
    #[error("band for area '{area}' level {level} has min {min} above max {max}")]
    InvertedBand {
        area: KnowledgeArea,
        level: u8,
        min: u16,
        max: u16,
    },
}

#[derive(Debug, Deserialize)]
struct BandRow {
    area: String,
    level: u8,
    min_score: u16,
    max_score: u16,
}

/// Score-range headings per (area, level), supplied as configuration next to the models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBands {
    bands: BTreeMap<(KnowledgeArea, u8), ScoreBand>,
}

const DEFAULT_BANDS: &[(KnowledgeArea, [(u16, u16); 5])] = &[
    (
        KnowledgeArea::Mathematics,
        [(0, 35), (36, 50), (51, 70), (71, 100), (0, 0)],
    ),
    (
        KnowledgeArea::NaturalSciences,
        [(0, 40), (41, 55), (56, 70), (71, 100), (0, 0)],
    ),
    (
        KnowledgeArea::SocialSciences,
        [(0, 40), (41, 55), (56, 70), (71, 100), (0, 0)],
    ),
    (
        KnowledgeArea::CriticalReading,
        [(0, 35), (36, 50), (51, 65), (66, 100), (0, 0)],
    ),
    (
        KnowledgeArea::English,
        [(0, 47), (48, 57), (58, 67), (68, 78), (79, 100)],
    ),
    (
        KnowledgeArea::Global,
        [(0, 200), (201, 250), (251, 300), (301, 350), (351, 500)],
    ),
];

impl Default for ScoreBands {
    fn default() -> Self {
        let mut bands = BTreeMap::new();
        for (area, ranges) in DEFAULT_BANDS {
            for level in 1..=area.max_level() {
                let (min_score, max_score) = ranges[usize::from(level) - 1];
                bands.insert(
                    (*area, level),
                    ScoreBand {
                        min_score,
                        max_score,
                    },
                );
            }
        }
        Self { bands }
    }
}

impl ScoreBands {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoreBandError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads `area,level,min_score,max_score` rows. Pairs absent from the file keep
    /// their default band.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScoreBandError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut bands = Self::default();

        for record in csv_reader.deserialize::<BandRow>() {
            let row = record?;
            let area = KnowledgeArea::from_slug(&row.area)
                .ok_or_else(|| ScoreBandError::UnknownArea(row.area.clone()))?;

            if row.level == 0 || row.level > area.max_level() {
                return Err(ScoreBandError::LevelOutOfRange {
                    area,
                    level: row.level,
                });
            }
            if row.min_score > row.max_score {
                return Err(ScoreBandError::InvertedBand {
                    area,
                    level: row.level,
                    min: row.min_score,
                    max: row.max_score,
                });
            }

            bands.bands.insert(
                (area, row.level),
                ScoreBand {
                    min_score: row.min_score,
                    max_score: row.max_score,
                },
            );
        }

        Ok(bands)
    }

    pub fn band(&self, area: KnowledgeArea, level: u8) -> Option<ScoreBand> {
        self.bands.get(&(area, level)).copied()
    }
}
