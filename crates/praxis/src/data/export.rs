use crate::scoring::{round_to, ScoredRow};
use serde::Serialize;
use std::cmp::Ordering;
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write scored export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode scored export: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Operator")]
    operator: &'a str,
    #[serde(rename = "Vessel")]
    vessel: &'a str,
    #[serde(rename = "Service")]
    service: &'a str,
    #[serde(rename = "BU")]
    business_unit: &'a str,
    #[serde(rename = "Wait Time (Hours): ATB-BTR")]
    wait_time_deviation: f64,
    #[serde(rename = "Arrival Accuracy (Final BTR)")]
    arrival_accuracy: &'static str,
    #[serde(rename = "Bunker Saved (USD)")]
    fuel_cost_saved: f64,
    #[serde(rename = "Carbon Abatement (Tonnes)")]
    carbon_abated: f64,
    #[serde(rename = "DIS_Score")]
    composite: f64,
    #[serde(rename = "Time_Efficiency")]
    time_efficiency: f64,
    #[serde(rename = "Cost_Efficiency")]
    cost_efficiency: f64,
    #[serde(rename = "Environmental_Score")]
    environmental: f64,
    #[serde(rename = "Risk_Score")]
    risk: f64,
}

impl<'a> From<&'a ScoredRow> for ExportRow<'a> {
    fn from(entry: &'a ScoredRow) -> Self {
        Self {
            operator: &entry.row.operator,
            vessel: &entry.row.vessel,
            service: entry.row.service.as_deref().unwrap_or(""),
            business_unit: entry.row.business_unit.as_deref().unwrap_or(""),
            wait_time_deviation: entry.row.wait_time_deviation,
            arrival_accuracy: if entry.row.arrival_accurate { "Y" } else { "N" },
            fuel_cost_saved: entry.row.fuel_cost_saved,
            carbon_abated: entry.row.carbon_abated,
            composite: entry.composite,
            time_efficiency: round_to(entry.scores.time_efficiency, 2),
            cost_efficiency: round_to(entry.scores.cost_efficiency, 2),
            environmental: round_to(entry.scores.environmental, 2),
            risk: round_to(entry.scores.risk, 2),
        }
    }
}

/// Writes scored rows as CSV, highest composite first. Returns the row count.
pub fn write_scored_csv<W: Write>(writer: W, scored: &[ScoredRow]) -> Result<usize, ExportError> {
    let mut ordered: Vec<&ScoredRow> = scored.iter().collect();
    ordered.sort_by(|a, b| b.composite.partial_cmp(&a.composite).unwrap_or(Ordering::Equal));

    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in &ordered {
        csv_writer.serialize(ExportRow::from(*entry))?;
    }
    csv_writer.flush()?;

    Ok(ordered.len())
}
