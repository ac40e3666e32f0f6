use std::path::PathBuf;

use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use plotters::prelude::*;
use tracing::debug;
use uuid::Uuid;

use crate::error::RenderError;
use crate::models::{ChartArtifact, ChartKind};

/// Charting capability the summarizer calls into. Implementations return
/// encoded PNG bytes; the summarizer never knows how images are displayed.
pub trait ChartRenderer {
    fn render_bar(
        &self,
        labels: &[String],
        values: &[f64],
        title: &str,
        x_label: &str,
        y_label: &str,
    ) -> Result<Vec<u8>, RenderError>;

    fn render_scatter(
        &self,
        x: &[f64],
        y: &[f64],
        title: &str,
        x_label: &str,
        y_label: &str,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Renderer backed by `plotters`, drawing into an RGB buffer and encoding
/// the result as PNG.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    width: u32,
    height: u32,
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl PlottersRenderer {
    fn encode_png(&self, rgb: &[u8]) -> Result<Vec<u8>, RenderError> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(rgb, self.width, self.height, image::ColorType::Rgb8)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(png)
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render_bar(
        &self,
        labels: &[String],
        values: &[f64],
        title: &str,
        x_label: &str,
        y_label: &str,
    ) -> Result<Vec<u8>, RenderError> {
        if labels.len() != values.len() {
            return Err(RenderError::Draw(format!(
                "label/value length mismatch: {} vs {}",
                labels.len(),
                values.len()
            )));
        }

        let mut rgb = vec![0u8; (self.width * self.height * 3) as usize];
        {
            let root =
                BitMapBackend::with_buffer(&mut rgb, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| RenderError::Draw(e.to_string()))?;

            let y_top = values.iter().cloned().fold(0.0_f64, f64::max);
            let y_top = if y_top > 0.0 { y_top * 1.1 } else { 1.0 };

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 24))
                .margin(10)
                .x_label_area_size(60)
                .y_label_area_size(50)
                .build_cartesian_2d((0u32..labels.len() as u32).into_segmented(), 0f64..y_top)
                .map_err(|e| RenderError::Draw(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(x_label)
                .y_desc(y_label)
                .x_label_formatter(&|segment: &SegmentValue<u32>| match segment {
                    SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels
                        .get(*i as usize)
                        .cloned()
                        .unwrap_or_default(),
                    _ => String::new(),
                })
                .draw()
                .map_err(|e| RenderError::Draw(e.to_string()))?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(BLUE.mix(0.6).filled())
                        .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
                )
                .map_err(|e| RenderError::Draw(e.to_string()))?;

            root.present()
                .map_err(|e| RenderError::Draw(e.to_string()))?;
        }

        self.encode_png(&rgb)
    }

    fn render_scatter(
        &self,
        x: &[f64],
        y: &[f64],
        title: &str,
        x_label: &str,
        y_label: &str,
    ) -> Result<Vec<u8>, RenderError> {
        if x.len() != y.len() {
            return Err(RenderError::Draw(format!(
                "x/y length mismatch: {} vs {}",
                x.len(),
                y.len()
            )));
        }

        let (x_min, x_max) = padded_range(x);
        let (y_min, y_max) = padded_range(y);

        let mut rgb = vec![0u8; (self.width * self.height * 3) as usize];
        {
            let root =
                BitMapBackend::with_buffer(&mut rgb, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| RenderError::Draw(e.to_string()))?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 24))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(|e| RenderError::Draw(e.to_string()))?;

            chart
                .configure_mesh()
                .x_desc(x_label)
                .y_desc(y_label)
                .draw()
                .map_err(|e| RenderError::Draw(e.to_string()))?;

            chart
                .draw_series(
                    x.iter()
                        .zip(y.iter())
                        .map(|(&xv, &yv)| Circle::new((xv, yv), 4, GREEN.filled())),
                )
                .map_err(|e| RenderError::Draw(e.to_string()))?;

            root.present()
                .map_err(|e| RenderError::Draw(e.to_string()))?;
        }

        self.encode_png(&rgb)
    }
}

/// Axis range with a small margin so edge points are not drawn on the
/// plot border. Degenerate spans widen to a unit interval.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = span * 0.05;
    (min - pad, max + pad)
}

/// Shared output storage for chart images, namespaced per request so
/// concurrent uploads cannot overwrite each other's artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    out_dir: PathBuf,
    request_id: String,
}

impl ArtifactStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self::with_request_id(out_dir, Uuid::new_v4().to_string())
    }

    /// Fixed request id, for callers that need deterministic names.
    pub fn with_request_id(out_dir: impl Into<PathBuf>, request_id: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            request_id: request_id.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn save(&self, kind: ChartKind, png: &[u8]) -> Result<ChartArtifact, RenderError> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self
            .out_dir
            .join(format!("{}-{}.png", kind.file_stem(), self.request_id));
        std::fs::write(&path, png)?;
        debug!(path = %path.display(), "chart artifact written");
        Ok(ChartArtifact { kind, path })
    }
}
