use super::area::KnowledgeArea;
use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_BLOCKS: u8 = 4;

/// 1-based ordinal performance bucket; `0` means no prediction yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceLevel(pub u8);

impl PerformanceLevel {
    pub const NONE: PerformanceLevel = PerformanceLevel(0);

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Whether the level exists for `area` (1..=max_level).
    pub const fn within(self, area: KnowledgeArea) -> bool {
        self.0 >= 1 && self.0 <= area.max_level()
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arg-max over the distribution plus one. Ties resolve to the lowest index; NaN never wins.
pub fn select_level(distribution: &[f64]) -> PerformanceLevel {
    let mut best: Option<(usize, f64)> = None;

    for (index, probability) in distribution.iter().copied().enumerate() {
        if probability.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if probability <= current => {}
            _ => best = Some((index, probability)),
        }
    }

    match best {
        Some((index, _)) => PerformanceLevel(u8::try_from(index + 1).unwrap_or(u8::MAX)),
        None => PerformanceLevel::NONE,
    }
}

/// Chart-ready description of the level blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelChart {
    pub total_blocks: u8,
    pub filled_blocks: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted_index: Option<u8>,
    pub labels: Vec<String>,
}

impl LevelChart {
    pub fn for_level(area: Option<KnowledgeArea>, level: PerformanceLevel) -> Self {
        let (total_blocks, labels) = match area {
            Some(area) => (area.max_level(), area.level_labels()),
            None => (
                DEFAULT_BLOCKS,
                (1..=DEFAULT_BLOCKS).map(|n| n.to_string()).collect(),
            ),
        };

        let filled_blocks = level.get().min(total_blocks);
        let highlighted_index = filled_blocks.checked_sub(1);

        Self {
            total_blocks,
            filled_blocks,
            highlighted_index,
            labels,
        }
    }

    pub fn empty(area: Option<KnowledgeArea>) -> Self {
        Self::for_level(area, PerformanceLevel::NONE)
    }
}
