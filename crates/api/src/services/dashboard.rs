//! Dashboard rendering.
//!
//! Turns an owner's entries into a three-panel trend chart (temperature,
//! humidity, wind speed) and a CSV export of the same rows. The chart is a
//! plain raster with no text; panel titles, units and value ranges are
//! returned next to the image instead.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{NaiveDateTime, Utc};
use domain::models::WeatherEntry;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use serde::Serialize;
use shared::time::format_timestamp;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{DashboardConfig, ExportNaming};

/// Filename used when exports are not timestamped.
pub const STATIC_EXPORT_FILENAME: &str = "weather_forecast_data.csv";

/// Column header of the CSV export.
pub const CSV_HEADER: &str = "id,DateTime,Temperature,Humidity,WindSpeed,Description,City,Source";

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const FRAME: Rgb<u8> = Rgb([120, 120, 120]);

const MARGIN_LEFT: f32 = 70.0;
const MARGIN_RIGHT: f32 = 30.0;
const PANEL_PAD_TOP: f32 = 30.0;
const PANEL_PAD_BOTTOM: f32 = 30.0;
const GRID_DIVISIONS: u32 = 5;
const MARKER_RADIUS: i32 = 4;

/// Dashboard rendering errors.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No data to visualize")]
    EmptyInput,

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One of the three plotted measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    WindSpeed,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::WindSpeed];

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature Forecast Trend",
            Metric::Humidity => "Humidity Forecast Trend",
            Metric::WindSpeed => "Wind Speed Forecast Trend",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::WindSpeed => "m/s",
        }
    }

    pub fn color(&self) -> Rgb<u8> {
        match self {
            Metric::Temperature => Rgb([220, 20, 20]),
            Metric::Humidity => Rgb([20, 60, 220]),
            Metric::WindSpeed => Rgb([20, 150, 40]),
        }
    }

    fn value(&self, entry: &WeatherEntry) -> f64 {
        match self {
            Metric::Temperature => entry.temperature,
            Metric::Humidity => entry.humidity,
            Metric::WindSpeed => entry.wind_speed,
        }
    }
}

/// Panel metadata returned alongside the image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSummary {
    pub title: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
}

/// Output of a successful render.
#[derive(Debug, Clone)]
pub struct RenderedDashboard {
    /// PNG bytes, base64 encoded.
    pub image_base64: String,
    pub export_filename: String,
    pub export_path: PathBuf,
    /// Number of data rows written to the export.
    pub rows: usize,
    pub panels: Vec<PanelSummary>,
}

/// Pixel rectangle a panel plots into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl PlotArea {
    fn right(&self) -> f32 {
        self.left + self.width
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// A panel with its points already mapped to pixel space.
#[derive(Debug, Clone)]
pub(crate) struct PanelLayout {
    pub metric: Metric,
    pub area: PlotArea,
    pub points: Vec<(f32, f32)>,
    pub min: f64,
    pub max: f64,
}

/// Lays out the three panels for entries already sorted ascending.
pub(crate) fn layout_panels(entries: &[WeatherEntry], width: u32, height: u32) -> Vec<PanelLayout> {
    let panel_height = height as f32 / Metric::ALL.len() as f32;
    let timestamps: Vec<NaiveDateTime> = entries.iter().map(|e| e.timestamp).collect();

    Metric::ALL
        .iter()
        .enumerate()
        .map(|(i, metric)| {
            let area = PlotArea {
                left: MARGIN_LEFT,
                top: panel_height * i as f32 + PANEL_PAD_TOP,
                width: width as f32 - MARGIN_LEFT - MARGIN_RIGHT,
                height: panel_height - PANEL_PAD_TOP - PANEL_PAD_BOTTOM,
            };

            let values: Vec<f64> = entries.iter().map(|e| metric.value(e)).collect();
            let (min, max) = value_range(&values);
            let (lo, hi) = padded_range(min, max);

            let points = timestamps
                .iter()
                .zip(&values)
                .map(|(ts, v)| {
                    (
                        x_position(*ts, &timestamps, &area),
                        y_position(*v, lo, hi, &area),
                    )
                })
                .collect();

            PanelLayout {
                metric: *metric,
                area,
                points,
                min,
                max,
            }
        })
        .collect()
}

fn value_range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Widens the value range so points never sit on the frame.
///
/// Spans are computed from halves so extreme finite values cannot
/// overflow to infinity.
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let half_span = max / 2.0 - min / 2.0;
    let pad = if half_span.abs() < f64::EPSILON {
        1.0
    } else {
        half_span * 0.1
    };
    ((min - pad).max(f64::MIN), (max + pad).min(f64::MAX))
}

fn x_position(ts: NaiveDateTime, timestamps: &[NaiveDateTime], area: &PlotArea) -> f32 {
    let (first, last) = match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return area.left + area.width / 2.0,
    };

    let span = (last - first).num_seconds();
    if span <= 0 {
        return area.left + area.width / 2.0;
    }

    let offset = (ts - first).num_seconds() as f64 / span as f64;
    area.left + (offset as f32) * area.width
}

/// A degenerate or non-finite range puts the point mid-panel.
fn y_position(value: f64, lo: f64, hi: f64, area: &PlotArea) -> f32 {
    let half_span = hi / 2.0 - lo / 2.0;
    let ratio = (value / 2.0 - lo / 2.0) / half_span;
    let ratio = if half_span > 0.0 && ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.5
    };
    area.bottom() - ratio as f32 * area.height
}

fn draw_panel(img: &mut RgbImage, panel: &PanelLayout) {
    let area = &panel.area;

    for step in 0..=GRID_DIVISIONS {
        let fraction = step as f32 / GRID_DIVISIONS as f32;
        let y = area.top + fraction * area.height;
        draw_line_segment_mut(img, (area.left, y), (area.right(), y), GRID);
        let x = area.left + fraction * area.width;
        draw_line_segment_mut(img, (x, area.top), (x, area.bottom()), GRID);
    }

    draw_hollow_rect_mut(
        img,
        Rect::at(area.left as i32, area.top as i32).of_size(area.width as u32, area.height as u32),
        FRAME,
    );

    let color = panel.metric.color();
    for pair in panel.points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        // Two pixel wide line.
        draw_line_segment_mut(img, start, end, color);
        draw_line_segment_mut(img, (start.0, start.1 + 1.0), (end.0, end.1 + 1.0), color);
    }

    for (x, y) in &panel.points {
        draw_filled_circle_mut(img, (*x as i32, *y as i32), MARKER_RADIUS, color);
    }
}

fn encode_png(img: &RgbImage) -> Result<Vec<u8>, DashboardError> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Quotes a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Builds the CSV export for entries in the given order.
pub fn to_csv(entries: &[WeatherEntry]) -> String {
    let mut csv = String::new();
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for entry in entries {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            entry.id,
            format_timestamp(&entry.timestamp),
            csv_number(entry.temperature),
            csv_number(entry.humidity),
            csv_number(entry.wind_speed),
            csv_field(&entry.description),
            csv_field(entry.city.as_deref().unwrap_or_default()),
            entry.source,
        ));
    }

    csv
}

/// Replaces anything that is not safe in a filename.
fn filename_safe(owner_id: &str) -> String {
    owner_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Renders dashboards and writes their exports.
#[derive(Debug, Clone)]
pub struct DashboardRenderer {
    export_dir: PathBuf,
    naming: ExportNaming,
    width: u32,
    height: u32,
}

impl DashboardRenderer {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            export_dir: config.export_dir.clone(),
            naming: config.export_naming,
            width: config.width,
            height: config.height,
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    fn export_filename(&self, owner_id: &str) -> String {
        match self.naming {
            ExportNaming::Static => STATIC_EXPORT_FILENAME.to_string(),
            ExportNaming::Timestamped => format!(
                "weather_forecast_{}_{}.csv",
                filename_safe(owner_id),
                Utc::now().format("%Y%m%d_%H%M%S")
            ),
        }
    }

    /// Renders the chart and writes the CSV export.
    ///
    /// Entries are sorted ascending by timestamp. The sort is stable, so
    /// entries sharing a timestamp keep their incoming order.
    pub fn render(
        &self,
        owner_id: &str,
        mut entries: Vec<WeatherEntry>,
    ) -> Result<RenderedDashboard, DashboardError> {
        if entries.is_empty() {
            return Err(DashboardError::EmptyInput);
        }
        entries.sort_by_key(|e| e.timestamp);

        let panels = layout_panels(&entries, self.width, self.height);
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        for panel in &panels {
            draw_panel(&mut img, panel);
        }
        let png = encode_png(&img)?;
        debug!(bytes = png.len(), "Encoded dashboard image");

        let export_filename = self.export_filename(owner_id);
        let export_path = self.export_dir.join(&export_filename);
        write_file(&export_path, &to_csv(&entries))?;

        info!(
            owner_id,
            rows = entries.len(),
            export = %export_path.display(),
            "Dashboard rendered"
        );

        Ok(RenderedDashboard {
            image_base64: STANDARD.encode(png),
            export_filename,
            export_path,
            rows: entries.len(),
            panels: panels
                .iter()
                .map(|p| PanelSummary {
                    title: p.metric.title(),
                    unit: p.metric.unit(),
                    min: p.min,
                    max: p.max,
                })
                .collect(),
        })
    }
}

/// Writes content to a file, creating the parent directory.
fn write_file(path: &Path, content: &str) -> Result<(), DashboardError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use domain::models::EntrySource;
    use tempfile::TempDir;

    fn entry(id: i64, hour: u32, temperature: f64) -> WeatherEntry {
        WeatherEntry {
            id,
            owner_id: "default".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            temperature,
            humidity: 50.0 + hour as f64,
            wind_speed: 2.0,
            description: "clear".to_string(),
            city: Some("Bengaluru".to_string()),
            source: EntrySource::Manual,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn renderer(dir: &TempDir, naming: ExportNaming) -> DashboardRenderer {
        DashboardRenderer::new(&DashboardConfig {
            export_dir: dir.path().to_path_buf(),
            export_naming: naming,
            width: 1400,
            height: 1000,
        })
    }

    #[test]
    fn test_layout_extreme_values_stay_in_panel() {
        let entries = vec![entry(1, 0, -1e308), entry(2, 1, 1e308), entry(3, 2, f64::MAX)];

        for panel in layout_panels(&entries, 1400, 1000) {
            let area = &panel.area;
            for (x, y) in &panel.points {
                assert!(x.is_finite() && y.is_finite(), "{:?}", panel.points);
                assert!(*x >= area.left && *x <= area.right());
                assert!(*y >= area.top && *y <= area.bottom());
            }
        }

        let temperature = &layout_panels(&entries, 1400, 1000)[0];
        assert!(temperature.points[0].1 > temperature.points[1].1);
    }

    #[test]
    fn test_layout_single_huge_value_is_centered() {
        let entries = vec![entry(1, 0, 1e308)];
        let temperature = &layout_panels(&entries, 1400, 1000)[0];
        let area = &temperature.area;
        let (_, y) = temperature.points[0];
        assert!((y - (area.top + area.height / 2.0)).abs() < 1.0);
    }

    #[test]
    fn test_render_empty_input() {
        let dir = TempDir::new().unwrap();
        let result = renderer(&dir, ExportNaming::Static).render("default", vec![]);
        assert!(matches!(result, Err(DashboardError::EmptyInput)));
        assert!(!dir.path().join(STATIC_EXPORT_FILENAME).exists());
    }

    #[test]
    fn test_render_sorts_ascending_and_exports_rows() {
        let dir = TempDir::new().unwrap();
        // Newest first, as the store lists them.
        let entries = vec![entry(2, 3, 12.0), entry(1, 0, 10.0)];

        let rendered = renderer(&dir, ExportNaming::Static)
            .render("default", entries)
            .unwrap();
        assert_eq!(rendered.rows, 2);
        assert_eq!(rendered.export_filename, STATIC_EXPORT_FILENAME);

        let csv = fs::read_to_string(&rendered.export_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("1,2024-01-01 00:00:00,10.0,"));
        assert!(lines[2].starts_with("2,2024-01-01 03:00:00,12.0,"));
    }

    #[test]
    fn test_render_produces_png_with_panel_colors() {
        let dir = TempDir::new().unwrap();
        let rendered = renderer(&dir, ExportNaming::Static)
            .render("default", vec![entry(1, 0, 10.0), entry(2, 3, 12.0)])
            .unwrap();

        let png = STANDARD.decode(&rendered.image_base64).unwrap();
        let img = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .unwrap()
            .to_rgb8();
        assert_eq!(img.dimensions(), (1400, 1000));

        let panels = layout_panels(&[entry(1, 0, 10.0), entry(2, 3, 12.0)], 1400, 1000);
        for panel in &panels {
            let (x, y) = panel.points[0];
            assert_eq!(
                *img.get_pixel(x as u32, y as u32),
                panel.metric.color(),
                "{:?} marker missing",
                panel.metric
            );
        }
    }

    #[test]
    fn test_render_panel_summaries() {
        let dir = TempDir::new().unwrap();
        let rendered = renderer(&dir, ExportNaming::Static)
            .render("default", vec![entry(1, 0, 10.0), entry(2, 3, 12.0)])
            .unwrap();

        assert_eq!(rendered.panels.len(), 3);
        assert_eq!(rendered.panels[0].title, "Temperature Forecast Trend");
        assert_eq!(rendered.panels[0].min, 10.0);
        assert_eq!(rendered.panels[0].max, 12.0);
        assert_eq!(rendered.panels[1].unit, "%");
        assert_eq!(rendered.panels[2].unit, "m/s");
    }

    #[test]
    fn test_layout_earlier_point_is_left() {
        let entries = vec![entry(1, 0, 10.0), entry(2, 3, 12.0)];
        let panels = layout_panels(&entries, 1400, 1000);
        let temperature = &panels[0];

        assert_eq!(temperature.metric, Metric::Temperature);
        let (x10, y10) = temperature.points[0];
        let (x12, y12) = temperature.points[1];
        assert!(x10 < x12);
        // Higher values sit closer to the top of the panel.
        assert!(y12 < y10);
    }

    #[test]
    fn test_layout_panels_stacked_vertically() {
        let panels = layout_panels(&[entry(1, 0, 10.0)], 1400, 1000);
        assert!(panels[0].area.bottom() <= panels[1].area.top);
        assert!(panels[1].area.bottom() <= panels[2].area.top);
        for panel in &panels {
            let (x, y) = panel.points[0];
            assert!(x >= panel.area.left && x <= panel.area.right());
            assert!(y >= panel.area.top && y <= panel.area.bottom());
        }
    }

    #[test]
    fn test_layout_duplicate_timestamps_kept() {
        let entries = vec![entry(1, 0, 10.0), entry(2, 0, 14.0), entry(3, 6, 12.0)];
        let panels = layout_panels(&entries, 1400, 1000);
        assert_eq!(panels[0].points.len(), 3);
        assert_eq!(panels[0].points[0].0, panels[0].points[1].0);
    }

    #[test]
    fn test_timestamped_export_name() {
        let dir = TempDir::new().unwrap();
        let rendered = renderer(&dir, ExportNaming::Timestamped)
            .render("team/alpha", vec![entry(1, 0, 10.0)])
            .unwrap();

        assert!(rendered
            .export_filename
            .starts_with("weather_forecast_team_alpha_"));
        assert!(rendered.export_filename.ends_with(".csv"));
        assert_eq!(rendered.export_path.parent(), Some(dir.path()));
    }

    #[test]
    fn test_csv_quoting() {
        let mut e = entry(1, 0, 21.5);
        e.description = "rain, \"heavy\"".to_string();
        e.city = None;
        let csv = to_csv(&[e]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "1,2024-01-01 00:00:00,21.5,50.0,2.0,\"rain, \"\"heavy\"\"\",,manual"
        );
    }

    #[test]
    fn test_filename_safe() {
        assert_eq!(filename_safe("user-1_a"), "user-1_a");
        assert_eq!(filename_safe("../etc"), "___etc");
    }
}
