//! The `traffic` command: show current weights or shift traffic onto a
//! version.

use crate::error::{CliError, CliResult};
use crate::output::print_ok;
use crate::report;
use std::collections::BTreeMap;
use switchyard_api::{list_complete, HostedZone, RecordSink, RecordSource, VersionRegistry};
use switchyard_core::domain::{RecordType, RoutingRecord, StackVersion, VersionId};
use switchyard_core::shift::{build_changes, plan_shift, read_weights, ShiftOutcome, TrafficPlan};
use switchyard_core::PERCENT_RESOLUTION;
use tracing::{info, warn};

/// What a completed shift did, for callers that want to inspect the
/// result beyond the printed report.
#[derive(Debug)]
pub struct ShiftSummary {
    /// The planned weight reassignment.
    pub plan: TrafficPlan,
    /// Number of record changes submitted; zero means the record set
    /// already matched.
    pub change_count: usize,
}

/// Entry point for the `traffic` command.
pub async fn execute<P>(
    provider: &P,
    stack: &str,
    version: Option<&str>,
    percentage: Option<f64>,
) -> CliResult<()>
where
    P: RecordSource + RecordSink + VersionRegistry,
{
    match percentage {
        None => show_traffic(provider, stack, version).await,
        Some(percentage) => {
            let version = version.ok_or_else(|| {
                CliError::Usage("a version is required to change traffic".to_string())
            })?;
            change_traffic(provider, stack, version, percentage)
                .await
                .map(|_| ())
        }
    }
}

struct ResolvedStack {
    versions: Vec<StackVersion>,
    version_order: BTreeMap<VersionId, String>,
}

async fn resolve_stack<P: VersionRegistry>(provider: &P, stack: &str) -> CliResult<ResolvedStack> {
    let versions = provider.stack_versions(stack).await?;
    if versions.is_empty() {
        return Err(CliError::Usage(format!(
            "no stack version of {stack:?} found"
        )));
    }
    let version_order = versions
        .iter()
        .map(|v| (v.identifier(), v.version.clone()))
        .collect();
    Ok(ResolvedStack {
        versions,
        version_order,
    })
}

fn select_version<'a>(versions: &'a [StackVersion], version: &str) -> CliResult<&'a StackVersion> {
    versions
        .iter()
        .find(|v| v.version == version)
        .ok_or_else(|| CliError::Usage(format!("stack version {version} not found")))
}

fn require_dns_name(version: &StackVersion) -> CliResult<String> {
    version.dns_name().ok_or_else(|| {
        CliError::Usage(format!(
            "stack {} version {} has no domain",
            version.stack_name, version.version
        ))
    })
}

/// The hosted zone serving a version's domain is the parent domain: the
/// first label is the stack's own record name.
fn zone_domain(domain: &str) -> CliResult<&str> {
    domain
        .split_once('.')
        .map(|(_, parent)| parent)
        .filter(|parent| !parent.is_empty())
        .ok_or_else(|| CliError::Usage(format!("domain {domain:?} has no parent zone")))
}

async fn load_records<P: RecordSource>(
    provider: &P,
    domain: &str,
) -> CliResult<(HostedZone, Vec<RoutingRecord>)> {
    let zone = provider.zone(zone_domain(domain)?).await?;
    let records = list_complete(provider, &zone).await?;
    Ok((zone, records))
}

/// Prints the current weight table for every known version of the stack.
pub async fn show_traffic<P>(provider: &P, stack: &str, version: Option<&str>) -> CliResult<()>
where
    P: RecordSource + VersionRegistry,
{
    let resolved = resolve_stack(provider, stack).await?;
    let selected = match version {
        Some(v) => select_version(&resolved.versions, v)?,
        None => &resolved.versions[0],
    };
    let dns_name = require_dns_name(selected)?;
    let domain = selected.domain.clone().unwrap_or_default();
    let identifier = selected.identifier();

    let (_, records) = load_records(provider, &domain).await?;
    let snapshot = read_weights(
        &records,
        &dns_name,
        &identifier,
        resolved.version_order.keys(),
    );

    let marked = version.map(|_| &identifier);
    report::print_table(report::weight_rows(
        stack,
        &snapshot.weights,
        &resolved.version_order,
        marked,
    ));
    Ok(())
}

/// Shifts `percentage` percent of the domain's traffic onto the given
/// version and applies the resulting change batch.
pub async fn change_traffic<P>(
    provider: &P,
    stack: &str,
    version: &str,
    percentage: f64,
) -> CliResult<ShiftSummary>
where
    P: RecordSource + RecordSink + VersionRegistry,
{
    if !(0.0..=100.0).contains(&percentage) {
        return Err(CliError::Usage(format!(
            "percentage {percentage} is not between 0 and 100"
        )));
    }

    let resolved = resolve_stack(provider, stack).await?;
    let selected = select_version(&resolved.versions, version)?;
    let dns_name = require_dns_name(selected)?;
    let domain = selected.domain.clone().unwrap_or_default();
    let identifier = selected.identifier();

    let (zone, records) = load_records(provider, &domain).await?;
    let units = (percentage * PERCENT_RESOLUTION as f64) as i64;
    let snapshot = read_weights(
        &records,
        &dns_name,
        &identifier,
        resolved.version_order.keys(),
    );

    let plan = plan_shift(&snapshot, &identifier, units, &resolved.version_order)?;

    match plan.outcome {
        ShiftOutcome::RecordRemoved => {
            print_ok(&format!(
                "DNS record {dns_name:?} will be removed from that stack"
            ));
        }
        ShiftOutcome::Applied {
            requested,
            achieved,
            adjusted,
        } => {
            if adjusted {
                warn!(
                    "changing given percentage from {} to {} because all other versions \
                     are already getting the possible minimum traffic",
                    report::format_units(requested),
                    report::format_units(achieved),
                );
            }
            report::print_table(report::change_rows(stack, &plan, &resolved.version_order));
        }
    }

    let target_weight = plan.new_weights.get(&identifier).copied().unwrap_or(0);
    let needs_new_record = target_weight > 0
        && !records.iter().any(|r| {
            r.record_type == RecordType::Cname
                && r.name == dns_name
                && r.set_identifier == identifier
        });
    let lb_endpoint = match (&selected.lb_endpoint, needs_new_record) {
        (Some(lb), _) => lb.clone(),
        (None, false) => String::new(),
        (None, true) => {
            return Err(CliError::Usage(format!(
                "stack {} version {} has no load balancer to route traffic to",
                selected.stack_name, selected.version
            )))
        }
    };

    info!("setting weights for {dns_name}");
    let changes = build_changes(
        &dns_name,
        &identifier,
        &lb_endpoint,
        &plan.new_weights,
        &records,
    );
    let change_count = changes.len();
    if changes.is_empty() {
        print_ok("not changed");
    } else {
        let comment = format!("Weight change of {dns_name}");
        provider.apply(&zone, &comment, &changes).await?;
        if plan.new_weights.values().sum::<i64>() == 0 {
            print_ok("DISABLED");
        } else {
            print_ok("OK");
        }
    }

    Ok(ShiftSummary { plan, change_count })
}
