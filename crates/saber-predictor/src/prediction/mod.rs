//! Form answers to performance levels: evidence building, dispatch, level selection,
//! and the texts shown next to the prediction.

pub mod area;
pub mod bands;
pub mod catalog;
pub mod evidence;
pub mod interpretation;
pub mod level;
pub mod pipeline;
pub mod progress;
pub mod router;

pub use area::KnowledgeArea;
pub use bands::{ScoreBand, ScoreBandError, ScoreBands};
pub use catalog::{AreaBinding, CatalogError, FieldKind, FieldView, ParameterCatalog};
pub use evidence::{build_evidence, Evidence, EvidenceBuild, FieldValue, FormState};
pub use interpretation::{interpret, Interpretation};
pub use level::{select_level, LevelChart, PerformanceLevel};
pub use pipeline::{
    LevelProbability, PredictionContext, PredictionOutcome, PredictionRequest, PredictionStatus,
};
pub use progress::FormProgress;
pub use router::prediction_router;
