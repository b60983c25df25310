//! End-to-end report runs: load, normalize, aggregate, shape, write.
//!
//! Sources and sinks are passed in, so the same runs serve the CLI, tests and
//! any other caller.

use tracing::info;

use crate::analyzers::aggregate::{aggregate_monthly, aggregate_yearly};
use crate::error::PipelineError;
use crate::normalize::normalize_all;
use crate::output::{StagedReport, TableSink};
use crate::records::NormalizedRecord;
use crate::report::{ReportTable, shape_monthly, shape_yearly};
use crate::source::{RecordSource, load_rows};

/// Loads and normalizes every record of `source`.
pub fn load_records<S>(source: &S) -> Result<Vec<NormalizedRecord>, PipelineError>
where
    S: RecordSource + ?Sized,
{
    let rows = load_rows(source)?;
    Ok(normalize_all(&rows)?)
}

/// Monthly pass rates per exam type.
pub fn build_monthly(records: &[NormalizedRecord]) -> ReportTable {
    shape_monthly(&aggregate_monthly(records))
}

/// Yearly statistics per exam name.
pub fn build_yearly(records: &[NormalizedRecord]) -> ReportTable {
    shape_yearly(&aggregate_yearly(records))
}

#[tracing::instrument(skip_all, fields(source = %source.name(), sink = %sink.location()))]
pub fn run_monthly<S, K>(source: &S, sink: &K) -> Result<ReportTable, PipelineError>
where
    S: RecordSource + ?Sized,
    K: TableSink + ?Sized,
{
    let records = load_records(source)?;
    let table = build_monthly(&records);
    write(sink, &table)?;
    Ok(table)
}

#[tracing::instrument(skip_all, fields(source = %source.name(), sink = %sink.location()))]
pub fn run_yearly<S, K>(source: &S, sink: &K) -> Result<ReportTable, PipelineError>
where
    S: RecordSource + ?Sized,
    K: TableSink + ?Sized,
{
    let records = load_records(source)?;
    let table = build_yearly(&records);
    write(sink, &table)?;
    Ok(table)
}

/// Both reports from a single load. Nothing is written unless loading and
/// normalization succeed, and neither report is moved into place until both
/// have been staged.
#[tracing::instrument(skip_all, fields(source = %source.name()))]
pub fn run_all<S, M, Y>(
    source: &S,
    monthly_sink: &M,
    yearly_sink: &Y,
) -> Result<(ReportTable, ReportTable), PipelineError>
where
    S: RecordSource + ?Sized,
    M: TableSink + ?Sized,
    Y: TableSink + ?Sized,
{
    let records = load_records(source)?;
    let monthly = build_monthly(&records);
    let yearly = build_yearly(&records);

    let staged_monthly = monthly_sink.stage(&monthly)?;
    let staged_yearly = yearly_sink.stage(&yearly)?;
    commit(monthly_sink, &monthly, staged_monthly)?;
    commit(yearly_sink, &yearly, staged_yearly)?;
    Ok((monthly, yearly))
}

fn write<K: TableSink + ?Sized>(sink: &K, table: &ReportTable) -> Result<(), PipelineError> {
    let staged = sink.stage(table)?;
    commit(sink, table, staged)
}

fn commit<K: TableSink + ?Sized>(
    sink: &K,
    table: &ReportTable,
    staged: StagedReport,
) -> Result<(), PipelineError> {
    staged.commit()?;
    info!(
        report = %table.title,
        rows = table.rows.len(),
        columns = table.columns.len(),
        output = %sink.location(),
        "Report saved"
    );
    Ok(())
}
