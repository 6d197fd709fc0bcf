use crate::infra::{form_from_pairs, parse_field};
use clap::Args;
use saber_predictor::config::AppConfig;
use saber_predictor::error::AppError;
use saber_predictor::prediction::{
    interpret, KnowledgeArea, LevelChart, PerformanceLevel, PredictionContext, PredictionOutcome,
    PredictionRequest, ScoreBands,
};
use saber_predictor::telemetry;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Knowledge area (e.g. mathematics, ingles, global)
    #[arg(long)]
    pub(crate) area: Option<String>,
    /// Answered form field as key=value; checklist options are comma separated
    #[arg(long = "field", value_parser = parse_field)]
    pub(crate) fields: Vec<(String, String)>,
    /// Print the full outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct InterpretArgs {
    /// Knowledge area (e.g. lectura_critica)
    #[arg(long)]
    pub(crate) area: String,
    /// Performance level to describe
    #[arg(long)]
    pub(crate) level: u8,
}

/// Loads configuration and installs logging, as `serve` does.
fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;
    Ok(config)
}

fn load_context() -> Result<PredictionContext, AppError> {
    let config = load_config()?;
    PredictionContext::load(&config.assets)
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let context = load_context()?;
    let request = PredictionRequest {
        area: args.area,
        fields: form_from_pairs(args.fields, context.catalog()),
    };

    let outcome = context.predict(&request);
    if args.json {
        let rendered = serde_json::to_string_pretty(&outcome)
            .map_err(|err| AppError::Io(err.into()))?;
        println!("{rendered}");
    } else {
        render_outcome(&outcome);
    }

    Ok(())
}

pub(crate) fn run_interpret(args: InterpretArgs) -> Result<(), AppError> {
    let config = load_config()?;
    let bands = match &config.assets.score_bands_path {
        Some(path) => ScoreBands::from_path(path)?,
        None => ScoreBands::default(),
    };

    for line in interpretation_lines(&args.area, args.level, &bands) {
        println!("{line}");
    }
    Ok(())
}

/// Unrecognized areas fall through to the area-selection placeholder.
fn interpretation_lines(area: &str, level: u8, bands: &ScoreBands) -> Vec<String> {
    let area = KnowledgeArea::from_slug(area);
    let level = PerformanceLevel(level);

    let mut lines = Vec::with_capacity(4);
    if let Some(area) = area {
        lines.push(format!("{} ({})", area.label(), area.slug()));
    }
    lines.push(render_chart(&LevelChart::for_level(area, level)));
    let interpretation = interpret(area, level, bands);
    if !interpretation.heading.is_empty() {
        lines.push(interpretation.heading);
    }
    lines.push(interpretation.text);
    lines
}

pub(crate) fn run_models() -> Result<(), AppError> {
    let context = load_context()?;
    let models = context.models();

    println!(
        "Inference models ({} of {} areas available)",
        models.available_count(),
        KnowledgeArea::ALL.len()
    );
    for view in models.status() {
        match (view.available, view.loaded_at) {
            (true, Some(loaded_at)) => println!(
                "- {}: {} -> {} | loaded {}",
                view.area_label,
                view.model,
                view.target,
                loaded_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
            ),
            _ => println!(
                "- {}: {} -> {} | unavailable: {}",
                view.area_label,
                view.model,
                view.target,
                view.reason.as_deref().unwrap_or("unknown reason")
            ),
        }
    }
    Ok(())
}

fn render_chart(chart: &LevelChart) -> String {
    chart
        .labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            if index < usize::from(chart.filled_blocks) {
                format!("[#{label}]")
            } else {
                format!("[ {label}]")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_outcome(outcome: &PredictionOutcome) {
    match outcome.area {
        Some(area) => println!("Area: {} ({})", area.label(), area.slug()),
        None => println!("Area: not selected"),
    }
    println!("Status: {}", outcome.status.label());
    if let Some(detail) = &outcome.detail {
        println!("Detail: {detail}");
    }

    if !outcome.level.is_none() {
        match outcome.confidence {
            Some(confidence) => println!(
                "Predicted level: {} ({confidence:.2}% probability)",
                outcome.level
            ),
            None => println!("Predicted level: {}", outcome.level),
        }
        println!("Distribution:");
        for entry in &outcome.distribution {
            println!("  - {}: {:.2}%", entry.label, entry.probability * 100.0);
        }
    }

    println!("{}", render_chart(&outcome.chart));
    if !outcome.interpretation.heading.is_empty() {
        println!("{}", outcome.interpretation.heading);
    }
    println!("{}", outcome.interpretation.text);

    if !outcome.evidence.is_empty() {
        println!("Evidence:");
        for (variable, value) in outcome.evidence.iter() {
            println!("  {variable} = {value}");
        }
    }
    if !outcome.unmapped_fields.is_empty() {
        println!("Unmapped fields: {}", outcome.unmapped_fields.join(", "));
    }
    for ignored in &outcome.ignored_evidence {
        println!(
            "Ignored evidence: {} = {} ({})",
            ignored.variable,
            ignored.value,
            ignored.reason.as_str()
        );
    }
    println!(
        "Form progress: {}/{} fields ({}%)",
        outcome.progress.filled, outcome.progress.total, outcome.progress.percent
    );
}
