use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single row of the uploaded CSV. Header names are matched exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Study Hours")]
    pub study_hours: f64,
    #[serde(rename = "Exam Score")]
    pub exam_score: f64,
}

/// An uploaded dataset, in file order. Built once per request and
/// discarded when the request completes.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<StudentRecord>,
}

impl Dataset {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn study_hours(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.study_hours)
    }

    pub fn exam_scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.exam_score)
    }
}

/// Which rendering path was taken for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Per-student charts.
    Small,
    /// Aggregated-by-bin chart.
    Large,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Small => "small",
            Strategy::Large => "large",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One study-hour group of a large dataset. The interval is `(low, high]`
/// except for the first bin, which also includes its left edge.
#[derive(Debug, Clone, Serialize)]
pub struct StudyHourBin {
    pub low: f64,
    pub high: f64,
    pub count: usize,
    /// Mean exam score of the members, `None` for an empty bin.
    pub mean_exam_score: Option<f64>,
}

impl StudyHourBin {
    pub fn label(&self) -> String {
        format!("({:.1}, {:.1}]", self.low, self.high)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Study hours per student (small strategy).
    BarByStudent,
    /// Study hours vs exam score (small strategy).
    ScatterStudyVsScore,
    /// Mean exam score per study-hour group (large strategy).
    BarByBin,
}

impl ChartKind {
    /// Base name for the written image, before the request id suffix.
    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartKind::BarByStudent => "study_hours",
            ChartKind::ScatterStudyVsScore => "study_vs_scores",
            ChartKind::BarByBin => "study_hours_grouped",
        }
    }
}

/// A rendered chart image on shared output storage.
#[derive(Debug, Clone, Serialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub path: PathBuf,
}

/// Everything the presentation layer needs for one upload.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResult {
    pub request_id: String,
    pub row_count: usize,
    pub average_study_hours: f64,
    pub average_exam_score: f64,
    pub strategy: Strategy,
    /// Populated for the large strategy only.
    pub bins: Vec<StudyHourBin>,
    pub charts: Vec<ChartArtifact>,
    pub notice: Option<String>,
    /// Charts that failed to render; statistics are still valid.
    pub render_warnings: Vec<String>,
}
