use analysis_core::{ordinal_year, Cell, MetricSeries, MetricTable, RawTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{normalize_label, AliasCatalog};

/// Default cap on trailing cells taken from a headerless row
pub const DEFAULT_MAX_ROW_VALUES: usize = 5;
/// Sheet holding the company metadata in spreadsheet exports
pub const DEFAULT_METADATA_TABLE: &str = "Data Sheet";
/// Prefix spreadsheet readers give to columns without a name
pub const DEFAULT_UNNAMED_SENTINEL: &str = "unnamed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverOptions {
    pub max_row_values: usize,
    pub metadata_table: String,
    pub unnamed_sentinel: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_row_values: DEFAULT_MAX_ROW_VALUES,
            metadata_table: DEFAULT_METADATA_TABLE.to_string(),
            unnamed_sentinel: DEFAULT_UNNAMED_SENTINEL.to_string(),
        }
    }
}

/// Output of one resolution run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resolution {
    pub entity: Option<String>,
    pub metrics: MetricTable,
}

/// Where a label was found inside a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelSite {
    Row(usize),
    Column(usize),
}

/// A label found in a table, not yet matched against the catalog
struct Candidate<'t> {
    table: &'t RawTable,
    site: LabelSite,
    label: String,
}

/// Locates canonical metrics in heterogeneous tables.
///
/// Stateless: every call is a pure function of the tables passed in.
#[derive(Debug, Clone)]
pub struct MetricResolver<'c> {
    catalog: &'c AliasCatalog,
    options: ResolverOptions,
}

impl MetricResolver<'static> {
    pub fn with_builtin_catalog() -> Self {
        Self::new(AliasCatalog::builtin(), ResolverOptions::default())
    }
}

impl<'c> MetricResolver<'c> {
    pub fn new(catalog: &'c AliasCatalog, options: ResolverOptions) -> Self {
        Self { catalog, options }
    }

    pub fn catalog(&self) -> &'c AliasCatalog {
        self.catalog
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve every catalog metric across `tables`.
    ///
    /// Scan order is table order, then row labels top to bottom, then column
    /// headers left to right. The first label that matches a still-unresolved
    /// metric and yields at least one value wins.
    pub fn resolve(&self, tables: &[RawTable]) -> Resolution {
        let metrics = tables
            .iter()
            .flat_map(candidates)
            .fold(MetricTable::new(), |acc, candidate| self.absorb(acc, &candidate));

        let entity = self.extract_entity(tables);
        info!(
            tables = tables.len(),
            resolved = metrics.len(),
            catalog = self.catalog.len(),
            entity = entity.as_deref().unwrap_or("unknown"),
            "Resolved metrics"
        );

        Resolution { entity, metrics }
    }

    /// Resolve a single table in isolation.
    ///
    /// Combine per-table results with [`merge_first_wins`] to resolve tables in
    /// parallel. The merged result equals [`MetricResolver::resolve`] except
    /// when a label matches several metrics and an earlier table already
    /// resolved the first of them.
    pub fn resolve_table(&self, table: &RawTable) -> MetricTable {
        candidates(table).fold(MetricTable::new(), |acc, candidate| self.absorb(acc, &candidate))
    }

    /// Entity name from the metadata table's second header cell.
    pub fn extract_entity(&self, tables: &[RawTable]) -> Option<String> {
        let meta = tables.iter().find(|t| t.is_named(&self.options.metadata_table))?;
        let name = meta.header_at(1)?;
        if name
            .to_lowercase()
            .starts_with(&self.options.unnamed_sentinel.to_lowercase())
        {
            return None;
        }
        Some(name.to_string())
    }

    fn absorb(&self, mut acc: MetricTable, candidate: &Candidate<'_>) -> MetricTable {
        let Some(entry) = self
            .catalog
            .entries()
            .iter()
            .find(|e| !acc.contains(e.metric()) && e.matches(&candidate.label))
        else {
            return acc;
        };

        let series = self.collect_series(candidate);
        if series.is_empty() {
            debug!(
                metric = entry.metric(),
                label = %candidate.label,
                "Label matched but carried no values; keeping metric unresolved"
            );
            return acc;
        }

        debug!(
            metric = entry.metric(),
            label = %candidate.label,
            values = series.len(),
            "Resolved metric"
        );
        acc.insert_if_absent(entry.metric(), series);
        acc
    }

    fn collect_series(&self, candidate: &Candidate<'_>) -> MetricSeries {
        match candidate.site {
            LabelSite::Row(idx) => self.row_series(candidate.table, idx),
            LabelSite::Column(idx) => column_series(candidate.table, idx),
        }
    }

    /// Cells after the label. Headerless rows keep at most `max_row_values`
    /// cells; rows under a genuine header keep the full history and take
    /// their year labels from it.
    fn row_series(&self, table: &RawTable, row_idx: usize) -> MetricSeries {
        let row = &table.rows[row_idx];
        let limit = if table.header.is_some() {
            usize::MAX
        } else {
            self.options.max_row_values
        };

        let kept: Vec<(usize, &Cell)> = row
            .iter()
            .enumerate()
            .skip(1)
            .take(limit)
            .filter(|(_, cell)| !cell.is_empty())
            .collect();

        MetricSeries::from_pairs(kept.into_iter().enumerate().map(|(pos, (col, cell))| {
            let year = table
                .header_at(col)
                .map(str::to_string)
                .unwrap_or_else(|| ordinal_year(pos + 1));
            (year, cell.clone())
        }))
    }
}

/// Non-empty cells beneath a matched column header.
fn column_series(table: &RawTable, col_idx: usize) -> MetricSeries {
    let values = table
        .rows
        .iter()
        .filter_map(|row| row.get(col_idx))
        .filter(|cell| !cell.is_empty())
        .cloned()
        .collect();
    MetricSeries::with_ordinal_years(values)
}

fn candidates(table: &RawTable) -> impl Iterator<Item = Candidate<'_>> {
    let rows = table.rows.iter().enumerate().filter_map(move |(idx, row)| {
        let label = row.first()?.as_label()?;
        Some(Candidate {
            table,
            site: LabelSite::Row(idx),
            label: normalize_label(&label),
        })
    });

    let columns = table
        .header
        .iter()
        .flatten()
        .enumerate()
        .filter(|(_, label)| !label.trim().is_empty())
        .map(move |(idx, label)| Candidate {
            table,
            site: LabelSite::Column(idx),
            label: normalize_label(label),
        });

    rows.chain(columns)
}

/// Merge per-table results in declared order; earlier tables win conflicts.
pub fn merge_first_wins<I>(tables: I) -> MetricTable
where
    I: IntoIterator<Item = MetricTable>,
{
    tables
        .into_iter()
        .fold(MetricTable::new(), MetricTable::merge_first_wins)
}
