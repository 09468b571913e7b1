//! Human-facing traffic tables.
//!
//! Percentages shown here are the engine's fixed-point weights divided
//! by the resolution; the underlying delta, compensation, and final maps
//! come straight from the planned shift so the report is reproducible.

use std::collections::BTreeMap;
use switchyard_core::domain::VersionId;
use switchyard_core::shift::TrafficPlan;
use switchyard_core::{FULL_PERCENTAGE, PERCENT_RESOLUTION};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// One row of the current-weights table.
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct WeightRow {
    /// Stack name.
    #[tabled(rename = "stack_name")]
    pub stack_name: String,
    /// Version label.
    pub version: String,
    /// Routing-record set identifier.
    pub identifier: String,
    /// Current weight as a percentage.
    #[tabled(rename = "weight%")]
    pub weight: String,
    /// `<` marks the selected version.
    pub current: String,
}

/// One row of the traffic-change table.
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct ChangeRow {
    /// Stack name.
    #[tabled(rename = "stack_name")]
    pub stack_name: String,
    /// Version label.
    pub version: String,
    /// Routing-record set identifier.
    pub identifier: String,
    /// Weight before the shift as a percentage.
    #[tabled(rename = "old_weight%")]
    pub old_weight: String,
    /// Allocation delta as a percentage.
    pub delta: String,
    /// Compensation adjustment as a percentage.
    pub compensation: String,
    /// Weight after the shift as a percentage.
    #[tabled(rename = "new_weight%")]
    pub new_weight: String,
    /// `<` marks the shift target.
    pub current: String,
}

/// Formats a fixed-point weight as a percentage, dropping a trailing
/// `.0`.
pub fn format_units(units: i64) -> String {
    let percent = units as f64 / PERCENT_RESOLUTION as f64;
    if percent.fract() == 0.0 {
        format!("{percent:.0}")
    } else {
        format!("{percent:.1}")
    }
}

fn format_optional(units: i64) -> String {
    if units == 0 {
        String::new()
    } else {
        format_units(units)
    }
}

fn sorted_by_version(
    identifiers: impl Iterator<Item = VersionId>,
    version_order: &BTreeMap<VersionId, String>,
) -> Vec<VersionId> {
    let mut ids: Vec<VersionId> = identifiers.collect();
    ids.sort_by(|a, b| {
        let va = version_order.get(a).map(String::as_str).unwrap_or("");
        let vb = version_order.get(b).map(String::as_str).unwrap_or("");
        va.cmp(vb).then_with(|| a.cmp(b))
    });
    ids
}

/// Builds the current-weights rows, oldest version first.
pub fn weight_rows(
    stack_name: &str,
    weights: &BTreeMap<VersionId, i64>,
    version_order: &BTreeMap<VersionId, String>,
    selected: Option<&VersionId>,
) -> Vec<WeightRow> {
    sorted_by_version(weights.keys().cloned(), version_order)
        .into_iter()
        .map(|ident| WeightRow {
            stack_name: stack_name.to_string(),
            version: version_order.get(&ident).cloned().unwrap_or_default(),
            identifier: ident.to_string(),
            weight: format_units(weights[&ident]),
            current: if selected == Some(&ident) { "<" } else { "" }.to_string(),
        })
        .collect()
}

/// Builds the traffic-change rows for a planned shift, oldest version
/// first.
///
/// On a full switch, a row that moved only through compensation shows
/// the negated compensation as its delta, so the table still explains
/// where the traffic went.
pub fn change_rows(
    stack_name: &str,
    plan: &TrafficPlan,
    version_order: &BTreeMap<VersionId, String>,
) -> Vec<ChangeRow> {
    let full_switch = plan
        .new_weights
        .values()
        .max()
        .is_some_and(|&w| w == FULL_PERCENTAGE);

    sorted_by_version(plan.old_weights.keys().cloned(), version_order)
        .into_iter()
        .map(|ident| {
            let mut delta = plan.deltas.get(&ident).copied().unwrap_or(0);
            let compensation = plan.compensations.get(&ident).copied().unwrap_or(0);
            if full_switch && delta == 0 && compensation != 0 {
                delta = -compensation;
            }
            ChangeRow {
                stack_name: stack_name.to_string(),
                version: version_order.get(&ident).cloned().unwrap_or_default(),
                identifier: ident.to_string(),
                old_weight: format_units(plan.old_weights.get(&ident).copied().unwrap_or(0)),
                delta: format_optional(delta),
                compensation: format_optional(compensation),
                new_weight: format_units(plan.new_weights.get(&ident).copied().unwrap_or(0)),
                current: if plan.target == ident { "<" } else { "" }.to_string(),
            }
        })
        .collect()
}

/// Renders rows as a table on stdout.
pub fn print_table<R: Tabled>(rows: Vec<R>) {
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}
