use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::{
    boundary::BoundaryLayer,
    config::{Config, Mode},
    geocode::{self, CallBudget, GeocodingApi},
    lookup::AdminLookup,
    reconcile,
    site::{ChangeSet, SiteTable},
};

/// Summary of one enrichment run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub rows: usize,
    /// Rows changed by the geocoding stage.
    pub geocode_changes: ChangeSet,
    /// Rows changed by the boundary stage; None if the layer was not available.
    pub boundary_changes: Option<ChangeSet>,
    /// Union of every stage's changes.
    pub changes: ChangeSet,
    pub requests_used: usize,
    /// Row count per status tag.
    pub statuses: BTreeMap<String, usize>,
    pub partial_output: Option<PathBuf>,
    pub output: PathBuf,
}

impl PipelineReport {
    #[inline] pub fn boundaries_applied(&self) -> bool { self.boundary_changes.is_some() }
}

/// Loader → geocoder → spatial resolver → reconciler → writer.
pub struct Pipeline<'a> {
    config: Config,
    api: &'a dyn GeocodingApi,
    lookup: AdminLookup,
    budget: CallBudget,
}

impl<'a> Pipeline<'a> {
    /// Set up a run. The lookup table comes from `config.lookup`, or the bundled one.
    pub fn new(config: Config, api: &'a dyn GeocodingApi) -> Result<Self> {
        config.validate()?;
        let lookup = match &config.lookup {
            Some(path) => AdminLookup::from_json_file(path)?,
            None => AdminLookup::bundled()?,
        };
        let budget = CallBudget::new(config.max_requests);
        Ok(Self { config, api, lookup, budget })
    }

    /// Replace the lookup table.
    pub fn with_lookup(mut self, lookup: AdminLookup) -> Self {
        self.lookup = lookup;
        self
    }

    #[inline] pub fn config(&self) -> &Config { &self.config }

    #[inline] pub fn budget(&self) -> &CallBudget { &self.budget }

    /// Run the geocoding stage selected by the mode.
    pub fn geocode(&mut self, table: &mut SiteTable) -> ChangeSet {
        let changes = match self.config.mode {
            Mode::Forward => geocode::fill_coordinates(table.records_mut(), self.api, &mut self.budget),
            Mode::Reverse => geocode::fill_admin_labels(table.records_mut(), self.api, &mut self.budget, &self.lookup),
        };
        info!(mode = ?self.config.mode, changed = %changes, "geocoding stage done");
        changes
    }

    /// Load the boundary layer. Failure is logged and yields None.
    pub fn load_boundaries(&self) -> Option<BoundaryLayer> {
        let Some(path) = &self.config.boundaries else {
            warn!("no boundary layer configured; skipping spatial resolution");
            return None;
        };
        match BoundaryLayer::read_shapefile(path, &self.config.boundary) {
            Ok(layer) => Some(layer),
            Err(e) => {
                let error = format!("{e:#}");
                warn!(path = %path.display(), %error,
                    "boundary layer could not be loaded; skipping spatial resolution");
                None
            }
        }
    }

    /// Join records onto the layer and merge ward/constituency.
    pub fn resolve_boundaries(&self, table: &mut SiteTable, layer: &BoundaryLayer) -> ChangeSet {
        let matches = layer.join(table.records());
        reconcile::reconcile(table.records_mut(), &matches, self.config.precedence)
    }

    /// Run every stage in memory, with the layer already loaded (or absent).
    pub fn enrich(&mut self, table: &mut SiteTable, layer: Option<&BoundaryLayer>) -> (ChangeSet, Option<ChangeSet>) {
        let geocode_changes = self.geocode(table);
        let boundary_changes = layer.map(|layer| self.resolve_boundaries(table, layer));
        (geocode_changes, boundary_changes)
    }

    /// Read the input, enrich it, and write the output (plus the partial file, if any).
    pub fn run(&mut self) -> Result<PipelineReport> {
        let config = self.config.clone();
        let status_column = config.columns.status_for(config.mode);

        info!(path = %config.input.display(), encoding = %config.encoding, "loading sites");
        let mut table = SiteTable::read_csv(&config.input, &config.encoding, &config.columns)?;

        let geocode_changes = self.geocode(&mut table);

        let partial_output = config.partial_output_path();
        if let Some(path) = &partial_output {
            table.write_csv(path, &config.encoding, status_column)?;
            info!(path = %path.display(), "wrote partial results");
        }

        let boundary_changes = self.load_boundaries()
            .map(|layer| self.resolve_boundaries(&mut table, &layer));
        if boundary_changes.is_none() {
            warn!("boundary layer not applied; output holds geocoding results only");
        }

        table.write_csv(&config.output, &config.encoding, status_column)?;
        info!(path = %config.output.display(), "wrote results");

        let mut changes = geocode_changes.clone();
        if let Some(boundary) = &boundary_changes {
            changes.merge(boundary);
        }

        let mut statuses: BTreeMap<String, usize> = BTreeMap::new();
        for status in table.records().iter().filter_map(|r| r.status.clone()) {
            *statuses.entry(status).or_insert(0) += 1;
        }

        Ok(PipelineReport {
            rows: table.len(),
            geocode_changes,
            boundary_changes,
            changes,
            requests_used: self.budget.used(),
            statuses,
            partial_output,
            output: config.output,
        })
    }
}
