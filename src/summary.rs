use tracing::{info, warn};

use crate::chart::{ArtifactStore, ChartRenderer};
use crate::error::{RenderError, SummarizeError};
use crate::models::{
    ChartArtifact, ChartKind, Dataset, Strategy, StudentRecord, StudyHourBin, SummaryResult,
};

pub const DEFAULT_LARGE_THRESHOLD: usize = 100;
pub const DEFAULT_BIN_COUNT: usize = 5;
pub const DEFAULT_BAR_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Row count above which the aggregated-by-bin strategy is used.
    pub large_threshold: usize,
    /// Number of equal-width study-hour groups for large datasets.
    pub bin_count: usize,
    /// Cap on records shown in the per-student bar chart. The scatter
    /// chart always plots every record.
    pub bar_limit: usize,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            large_threshold: DEFAULT_LARGE_THRESHOLD,
            bin_count: DEFAULT_BIN_COUNT,
            bar_limit: DEFAULT_BAR_LIMIT,
        }
    }
}

/// Parse raw CSV bytes and summarize them in one pass:
/// parse, count, compute means, pick a strategy, emit charts.
pub fn summarize(
    bytes: &[u8],
    options: &SummarizeOptions,
    renderer: &dyn ChartRenderer,
    store: &ArtifactStore,
) -> Result<SummaryResult, SummarizeError> {
    let dataset = crate::ingest::parse_dataset(bytes)?;
    summarize_dataset(&dataset, options, renderer, store)
}

/// Summarize an already-parsed dataset. A chart that fails to render is
/// dropped into `render_warnings` instead of failing the request.
pub fn summarize_dataset(
    dataset: &Dataset,
    options: &SummarizeOptions,
    renderer: &dyn ChartRenderer,
    store: &ArtifactStore,
) -> Result<SummaryResult, SummarizeError> {
    if dataset.is_empty() {
        return Err(SummarizeError::EmptyDataset);
    }

    let row_count = dataset.row_count();
    let average_study_hours = mean(dataset.study_hours());
    let average_exam_score = mean(dataset.exam_scores());

    let strategy = if row_count <= options.large_threshold {
        Strategy::Small
    } else {
        Strategy::Large
    };
    info!(row_count, strategy = %strategy, "summarizing dataset");

    let mut charts = Vec::new();
    let mut render_warnings = Vec::new();
    let mut bins = Vec::new();
    let mut notice = None;

    match strategy {
        Strategy::Small => {
            let shown = &dataset.records()[..row_count.min(options.bar_limit)];
            let labels: Vec<String> = shown.iter().map(|r| r.name.clone()).collect();
            let values: Vec<f64> = shown.iter().map(|r| r.study_hours).collect();
            let bar = renderer
                .render_bar(
                    &labels,
                    &values,
                    "Study Hours per Student",
                    "Students",
                    "Study Hours",
                )
                .and_then(|png| store.save(ChartKind::BarByStudent, &png));
            push_chart(bar, &mut charts, &mut render_warnings);

            let hours: Vec<f64> = dataset.study_hours().collect();
            let scores: Vec<f64> = dataset.exam_scores().collect();
            let scatter = renderer
                .render_scatter(
                    &hours,
                    &scores,
                    "Study Hours vs Exam Scores",
                    "Study Hours",
                    "Exam Score",
                )
                .and_then(|png| store.save(ChartKind::ScatterStudyVsScore, &png));
            push_chart(scatter, &mut charts, &mut render_warnings);
        }
        Strategy::Large => {
            bins = bin_study_hours(dataset.records(), options.bin_count);
            let populated: Vec<&StudyHourBin> = bins.iter().filter(|b| b.count > 0).collect();
            let labels: Vec<String> = populated.iter().map(|b| b.label()).collect();
            let values: Vec<f64> = populated
                .iter()
                .filter_map(|b| b.mean_exam_score)
                .collect();
            let bar = renderer
                .render_bar(
                    &labels,
                    &values,
                    "Average Exam Score by Study Hour Group",
                    "Study Hour Groups",
                    "Average Exam Score",
                )
                .and_then(|png| store.save(ChartKind::BarByBin, &png));
            push_chart(bar, &mut charts, &mut render_warnings);

            notice = Some(format!(
                "The dataset contains {row_count} students, visualizing aggregated data by study hour groups."
            ));
        }
    }

    Ok(SummaryResult {
        request_id: store.request_id().to_string(),
        row_count,
        average_study_hours,
        average_exam_score,
        strategy,
        bins,
        charts,
        notice,
        render_warnings,
    })
}

/// Partition records into `bin_count` equal-width study-hour groups over
/// `[min, max]` and average exam scores per group. Boundary ties go to
/// the lower bin. A degenerate domain (all hours equal) collapses to a
/// single bin holding every record.
pub fn bin_study_hours(records: &[StudentRecord], bin_count: usize) -> Vec<StudyHourBin> {
    if records.is_empty() {
        return Vec::new();
    }
    let bin_count = bin_count.max(1);

    let min = records
        .iter()
        .map(|r| r.study_hours)
        .fold(f64::INFINITY, f64::min);
    let max = records
        .iter()
        .map(|r| r.study_hours)
        .fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        let score_sum: f64 = records.iter().map(|r| r.exam_score).sum();
        return vec![StudyHourBin {
            low: min,
            high: max,
            count: records.len(),
            mean_exam_score: Some(score_sum / records.len() as f64),
        }];
    }

    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    let mut score_sums = vec![0f64; bin_count];

    for record in records {
        let idx = bin_index(record.study_hours, min, width, bin_count);
        counts[idx] += 1;
        score_sums[idx] += record.exam_score;
    }

    (0..bin_count)
        .map(|i| {
            let low = min + i as f64 * width;
            let high = if i == bin_count - 1 {
                // Pin the last edge to max so the top record is never lost
                // to accumulated float error.
                max
            } else {
                min + (i + 1) as f64 * width
            };
            StudyHourBin {
                low,
                high,
                count: counts[i],
                mean_exam_score: (counts[i] > 0).then(|| score_sums[i] / counts[i] as f64),
            }
        })
        .collect()
}

fn bin_index(value: f64, min: f64, width: f64, bin_count: usize) -> usize {
    if value <= min {
        return 0;
    }
    let pos = ((value - min) / width).ceil() as usize;
    pos.saturating_sub(1).min(bin_count - 1)
}

fn push_chart(
    outcome: Result<ChartArtifact, RenderError>,
    charts: &mut Vec<ChartArtifact>,
    warnings: &mut Vec<String>,
) {
    match outcome {
        Ok(artifact) => charts.push(artifact),
        Err(err) => {
            warn!(error = %err, "chart dropped from summary");
            warnings.push(err.to_string());
        }
    }
}

// Caller guarantees at least one value.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    sum / count as f64
}
