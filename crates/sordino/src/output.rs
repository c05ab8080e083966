//! Rendering of shaped primitives for stdout.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use sordino_core::{Impulse, MotionSegment, MotionSegment2D, MotionSummary, SampledPoint};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Aligned columns followed by a summary line
    #[default]
    Table,
    Csv,
    Json,
}

/// A primitive that renders as one row of numbers.
pub trait Record: Serialize {
    const COLUMNS: &'static [&'static str];

    fn values(&self) -> Vec<f64>;
}

impl Record for Impulse {
    const COLUMNS: &'static [&'static str] = &["time", "amplitude"];

    fn values(&self) -> Vec<f64> {
        vec![self.time, self.amplitude]
    }
}

impl Record for MotionSegment {
    const COLUMNS: &'static [&'static str] =
        &["position", "speed_limit", "acceleration", "duration"];

    fn values(&self) -> Vec<f64> {
        vec![
            self.position,
            self.speed_limit,
            self.acceleration,
            self.duration,
        ]
    }
}

impl Record for SampledPoint {
    const COLUMNS: &'static [&'static str] = &["position", "velocity", "time"];

    fn values(&self) -> Vec<f64> {
        vec![self.position, self.velocity, self.time]
    }
}

impl Record for MotionSegment2D {
    const COLUMNS: &'static [&'static str] = &[
        "x_position",
        "y_position",
        "speed_limit",
        "acceleration",
        "duration",
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.x_position,
            self.y_position,
            self.speed_limit,
            self.acceleration,
            self.duration,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub max_speed: f64,
    pub total_time: f64,
}

impl Summary {
    pub fn of<T: MotionSummary + ?Sized>(primitives: &T) -> Self {
        Self {
            max_speed: primitives.max_speed(),
            total_time: primitives.total_time(),
        }
    }
}

#[derive(Serialize)]
struct Document<'a, R> {
    rows: &'a [R],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

pub fn render<R: Record>(rows: &[R], summary: Option<Summary>, format: Format) -> Result<String> {
    let text = match format {
        Format::Table => {
            let mut lines = vec![
                R::COLUMNS
                    .iter()
                    .map(|name| format!("{name:>12}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ];
            for row in rows {
                lines.push(
                    row.values()
                        .iter()
                        .map(|value| format!("{value:>12.6}"))
                        .collect::<Vec<_>>()
                        .join(" "),
                );
            }
            if let Some(summary) = summary {
                lines.push(format!(
                    "max_speed={:.6} total_time={:.6}",
                    summary.max_speed, summary.total_time
                ));
            }
            lines.join("\n")
        }
        Format::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            writer
                .write_record(R::COLUMNS)
                .context("failed to write CSV header")?;
            for row in rows {
                writer.serialize(row).context("failed to encode row as CSV")?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|err| err.into_error())
                .context("failed to flush CSV output")?;
            String::from_utf8(bytes)
                .context("CSV output is not valid UTF-8")?
                .trim_end()
                .to_string()
        }
        Format::Json => serde_json::to_string_pretty(&Document { rows, summary })
            .context("failed to encode output as JSON")?,
    };
    Ok(text)
}
