use std::fmt::Write;

use chrono::Utc;

use crate::models::{ChartKind, Dataset, Strategy, SummaryResult};

/// Rows listed in the student table before truncating.
const TABLE_LIMIT: usize = 50;

pub fn build_report(dataset: &Dataset, result: &SummaryResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Study Summary Report");
    let _ = writeln!(
        output,
        "Generated on {} (request {})",
        Utc::now().date_naive(),
        result.request_id
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Students: {}", result.row_count);
    let _ = writeln!(
        output,
        "- Average study hours: {:.2}",
        result.average_study_hours
    );
    let _ = writeln!(
        output,
        "- Average exam score: {:.2}",
        result.average_exam_score
    );
    let _ = writeln!(output, "- Strategy: {}", result.strategy);

    if let Some(notice) = &result.notice {
        let _ = writeln!(output);
        let _ = writeln!(output, "{notice}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Charts");
    if result.charts.is_empty() && result.render_warnings.is_empty() {
        let _ = writeln!(output, "No charts were produced.");
    }
    for chart in &result.charts {
        let _ = writeln!(
            output,
            "![{}]({})",
            chart_title(chart.kind),
            chart.path.display()
        );
    }
    for warning in &result.render_warnings {
        let _ = writeln!(output, "- Chart unavailable: {warning}");
    }

    if result.strategy == Strategy::Large {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Study Hour Groups");
        for bin in &result.bins {
            match bin.mean_exam_score {
                Some(mean) => {
                    let _ = writeln!(
                        output,
                        "- {}: average score {:.1} across {} students",
                        bin.label(),
                        mean,
                        bin.count
                    );
                }
                None => {
                    let _ = writeln!(output, "- {}: no students", bin.label());
                }
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students");
    let _ = writeln!(output, "| Name | Study Hours | Exam Score |");
    let _ = writeln!(output, "| --- | --- | --- |");
    for record in dataset.records().iter().take(TABLE_LIMIT) {
        let _ = writeln!(
            output,
            "| {} | {} | {} |",
            record.name, record.study_hours, record.exam_score
        );
    }
    if dataset.row_count() > TABLE_LIMIT {
        let _ = writeln!(
            output,
            "... and {} more students.",
            dataset.row_count() - TABLE_LIMIT
        );
    }

    output
}

fn chart_title(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::BarByStudent => "Study Hours per Student",
        ChartKind::ScatterStudyVsScore => "Study Hours vs Exam Scores",
        ChartKind::BarByBin => "Average Exam Score by Study Hour Group",
    }
}
