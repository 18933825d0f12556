use serde::{Deserialize, Deserializer, Serialize};

/// One vessel-operation record with the fields the scoring formulas need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub operator: String,
    pub vessel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<String>,
    /// Signed hours between actual berthing and the berth-time request.
    pub wait_time_deviation: f64,
    pub arrival_accurate: bool,
    pub berth_duration: f64,
    pub fuel_cost_saved: f64,
    pub carbon_abated: f64,
}

impl MetricsRow {
    /// Rejects rows whose numeric fields cannot take part in scoring.
    pub fn validate(&self) -> Result<(), InvalidRow> {
        let numeric = [
            (RequiredField::WaitTimeDeviation, self.wait_time_deviation),
            (RequiredField::BerthDuration, self.berth_duration),
            (RequiredField::FuelCostSaved, self.fuel_cost_saved),
            (RequiredField::CarbonAbated, self.carbon_abated),
        ];

        for (field, value) in numeric {
            if !value.is_finite() {
                return Err(InvalidRow::NonNumeric {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Fields a row must carry before it can be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    WaitTimeDeviation,
    ArrivalAccuracy,
    BerthDuration,
    FuelCostSaved,
    CarbonAbated,
}

impl RequiredField {
    pub fn label(self) -> &'static str {
        match self {
            RequiredField::WaitTimeDeviation => "Wait Time (Hours): ATB-BTR",
            RequiredField::ArrivalAccuracy => "Arrival Accuracy (Final BTR)",
            RequiredField::BerthDuration => "Berth Time (hours): ATU - ATB",
            RequiredField::FuelCostSaved => "Bunker Saved (USD)",
            RequiredField::CarbonAbated => "Carbon Abatement (Tonnes)",
        }
    }
}

/// A row that cannot be scored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRow {
    #[error("missing required field '{}'", .0.label())]
    Missing(RequiredField),
    #[error("field '{}' is not numeric or boolean-coercible: '{value}'", .field.label())]
    NonNumeric { field: RequiredField, value: String },
}

/// Loosely typed cell as it arrives from a CSV export or a JSON body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawField {
    fn as_f64(&self, field: RequiredField) -> Result<f64, InvalidRow> {
        let parsed = match self {
            RawField::Number(value) => Some(*value),
            RawField::Text(text) => text.trim().parse::<f64>().ok(),
            RawField::Bool(_) => None,
        };

        parsed
            .filter(|value| value.is_finite())
            .ok_or_else(|| InvalidRow::NonNumeric {
                field,
                value: self.display(),
            })
    }

    fn as_bool(&self, field: RequiredField) -> Result<bool, InvalidRow> {
        let parsed = match self {
            RawField::Bool(value) => Some(*value),
            RawField::Number(value) if *value == 1.0 => Some(true),
            RawField::Number(value) if *value == 0.0 => Some(false),
            RawField::Number(_) => None,
            RawField::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Some(true),
                "n" | "no" | "false" | "0" => Some(false),
                _ => None,
            },
        };

        parsed.ok_or_else(|| InvalidRow::NonNumeric {
            field,
            value: self.display(),
        })
    }

    fn as_text(&self) -> String {
        match self {
            RawField::Text(text) => text.trim().to_string(),
            other => other.display(),
        }
    }

    fn display(&self) -> String {
        match self {
            RawField::Bool(value) => value.to_string(),
            RawField::Number(value) => value.to_string(),
            RawField::Text(text) => text.clone(),
        }
    }
}

/// Unvalidated record keyed by the BI dataset's column headers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsRecord {
    #[serde(rename = "Operator", alias = "operator", default)]
    pub operator: Option<RawField>,
    #[serde(rename = "Vessel", alias = "vessel", default)]
    pub vessel: Option<RawField>,
    #[serde(rename = "Service", alias = "service", default)]
    pub service: Option<RawField>,
    #[serde(rename = "BU", alias = "business_unit", default)]
    pub business_unit: Option<RawField>,
    #[serde(
        rename = "Wait Time (Hours): ATB-BTR",
        alias = "wait_time_deviation",
        default,
        deserialize_with = "blank_as_none"
    )]
    pub wait_time_deviation: Option<RawField>,
    #[serde(
        rename = "Arrival Accuracy (Final BTR)",
        alias = "arrival_accurate",
        default,
        deserialize_with = "blank_as_none"
    )]
    pub arrival_accurate: Option<RawField>,
    #[serde(
        rename = "Berth Time (hours): ATU - ATB",
        alias = "berth_duration",
        default,
        deserialize_with = "blank_as_none"
    )]
    pub berth_duration: Option<RawField>,
    #[serde(
        rename = "Bunker Saved (USD)",
        alias = "fuel_cost_saved",
        default,
        deserialize_with = "blank_as_none"
    )]
    pub fuel_cost_saved: Option<RawField>,
    #[serde(
        rename = "Carbon Abatement (Tonnes)",
        alias = "carbon_abated",
        default,
        deserialize_with = "blank_as_none"
    )]
    pub carbon_abated: Option<RawField>,
}

impl TryFrom<MetricsRecord> for MetricsRow {
    type Error = InvalidRow;

    fn try_from(record: MetricsRecord) -> Result<Self, Self::Error> {
        let wait_time_deviation =
            required(&record.wait_time_deviation, RequiredField::WaitTimeDeviation)?
                .as_f64(RequiredField::WaitTimeDeviation)?;
        let arrival_accurate = required(&record.arrival_accurate, RequiredField::ArrivalAccuracy)?
            .as_bool(RequiredField::ArrivalAccuracy)?;
        let berth_duration = required(&record.berth_duration, RequiredField::BerthDuration)?
            .as_f64(RequiredField::BerthDuration)?;
        let fuel_cost_saved = required(&record.fuel_cost_saved, RequiredField::FuelCostSaved)?
            .as_f64(RequiredField::FuelCostSaved)?;
        let carbon_abated = required(&record.carbon_abated, RequiredField::CarbonAbated)?
            .as_f64(RequiredField::CarbonAbated)?;

        Ok(MetricsRow {
            operator: text_or_empty(&record.operator),
            vessel: text_or_empty(&record.vessel),
            service: optional_text(&record.service),
            business_unit: optional_text(&record.business_unit),
            wait_time_deviation,
            arrival_accurate,
            berth_duration,
            fuel_cost_saved,
            carbon_abated,
        })
    }
}

/// Position and cause of a record dropped from a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub index: usize,
    pub reason: String,
}

/// Converts records into rows, keeping the index of every rejected record.
pub fn parse_records<I>(records: I) -> (Vec<MetricsRow>, Vec<RejectedRow>)
where
    I: IntoIterator<Item = MetricsRecord>,
{
    let mut rows = Vec::new();
    let mut rejected = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        match MetricsRow::try_from(record) {
            Ok(row) => rows.push(row),
            Err(err) => rejected.push(RejectedRow {
                index,
                reason: err.to_string(),
            }),
        }
    }

    (rows, rejected)
}

fn required(value: &Option<RawField>, field: RequiredField) -> Result<&RawField, InvalidRow> {
    value.as_ref().ok_or(InvalidRow::Missing(field))
}

fn text_or_empty(value: &Option<RawField>) -> String {
    value.as_ref().map(RawField::as_text).unwrap_or_default()
}

fn optional_text(value: &Option<RawField>) -> Option<String> {
    value
        .as_ref()
        .map(RawField::as_text)
        .filter(|text| !text.is_empty())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<RawField>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<RawField>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !matches!(value, RawField::Text(text) if text.trim().is_empty())))
}
