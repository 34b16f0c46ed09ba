use anyhow::Result;
use csv::Writer;
use serde::Serialize;
use std::fmt::Write as _;

use crate::domain::category::style_for;
use crate::domain::geo::{Coordinate, format_distance, haversine_distance};
use crate::domain::task::MapTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// One pin as printed by the CLI.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportedMarker {
    pub id: String,
    pub title: String,
    pub category: String,
    pub icon: String,
    pub budget: f64,
    pub urgent: bool,
    pub distance: String,
    pub latitude: f64,
    pub longitude: f64,
    pub display_latitude: f64,
    pub display_longitude: f64,
}

impl ExportedMarker {
    pub fn new(origin: &Coordinate, marker: &MapTask) -> Self {
        let task = &marker.task;
        ExportedMarker {
            id: task.id.to_string(),
            title: task.title.clone(),
            category: style_for(task.category.as_deref()).label.to_string(),
            icon: marker.icon.to_string(),
            budget: task.budget,
            urgent: task.is_urgent,
            distance: format_distance(haversine_distance(origin, &task.coordinate())),
            latitude: task.latitude,
            longitude: task.longitude,
            display_latitude: marker.display.latitude,
            display_longitude: marker.display.longitude,
        }
    }
}

pub fn export_markers(origin: &Coordinate, markers: &[MapTask], format: ExportFormat) -> Result<String> {
    let rows: Vec<ExportedMarker> = markers.iter().map(|m| ExportedMarker::new(origin, m)).collect();
    match format {
        ExportFormat::Table => Ok(to_table(&rows)),
        ExportFormat::Csv => to_csv(&rows),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
    }
}

fn to_csv(rows: &[ExportedMarker]) -> Result<String> {
    let mut wtr = Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    // serialize() only emits headers with the first record
    if rows.is_empty() {
        wtr.write_record([
            "id",
            "title",
            "category",
            "icon",
            "budget",
            "urgent",
            "distance",
            "latitude",
            "longitude",
            "display_latitude",
            "display_longitude",
        ])?;
    }

    let data = wtr.into_inner()?;
    Ok(String::from_utf8(data)?)
}

fn to_table(rows: &[ExportedMarker]) -> String {
    if rows.is_empty() {
        return "No open tasks nearby\n".to_string();
    }

    let mut out = String::new();
    for row in rows {
        let urgent = if row.urgent { " [urgent]" } else { "" };
        let _ = writeln!(
            out,
            "{} {:<32} {:>8} {:>9.2} EUR{}",
            row.icon, row.title, row.distance, row.budget, urgent
        );
    }
    out
}
