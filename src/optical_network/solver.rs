// RSCA solver strategies behind one capability trait.
// GreedyHeuristic is self contained; ExactFormulation only prepares the MILP
// instance and hands it to an external backend, then audits what comes back

use tracing::info;

use super::catalog::{CandidateEntry, CatalogOptions, PathCatalog};
use super::config::RscaConfig;
use super::error::RsaError;
use super::grid::{GridLayout, SpectrumGrid};
use super::lightpath::Lightpath;
use super::scheduler::GreedyScheduler;
use super::summary::RunSummary;
use super::topology::{CandidatePathSource, Demand, Network, RateGbps};
use super::transponder::TransponderCatalog;
use super::verifier::verify;

pub struct Problem<'a> {
    pub network:&'a Network,
    pub demands:&'a [Demand],
    pub paths:&'a dyn CandidatePathSource,
    pub transponders:&'a TransponderCatalog,
    pub config:&'a RscaConfig,
}

impl<'a> Problem<'a> {
    pub fn new(network:&'a Network,demands:&'a [Demand],paths:&'a dyn CandidatePathSource,transponders:&'a TransponderCatalog,config:&'a RscaConfig) -> Self {
        Self {network,demands,paths,transponders,config}
    }
    // picks the reference transponder catalog matching config.num_cores
    pub fn with_reference_catalog(network:&'a Network,demands:&'a [Demand],paths:&'a dyn CandidatePathSource,config:&'a RscaConfig) -> Result<Self,RsaError> {
        let transponders = TransponderCatalog::reference(config.num_cores)?;
        Ok(Self::new(network, demands, paths, transponders, config))
    }

    pub fn validate(&self) -> Result<(),RsaError> {
        if self.network.is_empty() {return Err(RsaError::EmptyTopology)}
        if self.demands.is_empty() {return Err(RsaError::NoDemands)}
        self.config.validate()?;
        if self.transponders.is_empty() {
            return Err(RsaError::InvalidConfig("transponder catalog is empty".into()))
        }
        for (position,d) in self.demands.iter().enumerate() {
            let invalid = |reason| Err(RsaError::InvalidDemand { demand: position, reason });
            if d.id != position {return invalid("demand ids must match their position")}
            for node in [d.ingress,d.egress] {
                if node >= self.network.node_count() {return Err(RsaError::UnknownNode(node))}
            }
            if d.ingress == d.egress {return invalid("ingress and egress are the same node")}
            if !(d.offered_gbps.is_finite() && d.offered_gbps >= 0.0) {
                return invalid("offered traffic must be a non-negative number")
            }
        }
        Ok(())
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout {
            num_cores:self.config.num_cores,
            slots_per_core:self.config.num_slots_per_core,
            core_continuity:self.config.core_continuity(),
        }
    }

    // fresh copies with nothing carried, normalised if asked to
    fn prepared_demands(&self) -> Vec<Demand> {
        let mut demands = self.demands.to_vec();
        for d in demands.iter_mut() {
            d.reset();
        }
        if self.config.scale_traffic {
            super::topology::scale_offered_traffic(&mut demands, self.config.total_offered_traffic_gbps());
        }
        demands
    }

    fn build_catalog(&self,demands:&[Demand]) -> Result<PathCatalog,RsaError> {
        let options = CatalogOptions {
            max_paths_per_pair:self.config.max_paths_per_pair,
            max_path_length_km:self.config.max_path_length_km(),
        };
        PathCatalog::build(self.network, demands, self.paths, self.transponders, options)
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct Solution {
    pub lightpaths:Vec<Lightpath>,
    pub demands:Vec<Demand>,
    pub summary:RunSummary,
}

pub trait RscaSolver {
    fn name(&self) -> &'static str;
    fn solve(&self,problem:&Problem<'_>) -> Result<Solution,RsaError>;
}

#[derive(Clone,Copy,Debug,Default)]
pub struct GreedyHeuristic;

impl RscaSolver for GreedyHeuristic {
    fn name(&self) -> &'static str {
        "greedy-heuristic"
    }
    fn solve(&self,problem:&Problem<'_>) -> Result<Solution,RsaError> {
        problem.validate()?;
        let demands = problem.prepared_demands();
        let catalog = problem.build_catalog(&demands)?;
        let layout = problem.layout();
        let grid = SpectrumGrid::new(problem.network, layout)?;
        let outcome = GreedyScheduler::new(&catalog, grid, demands)?
            .with_max_rounds(problem.config.max_rounds)
            .run()?;
        verify(problem.network, &outcome.lightpaths, layout)?;
        let summary = RunSummary::new(&outcome.demands, &outcome.lightpaths, outcome.rounds, outcome.truncated);
        info!(solver = self.name(), %summary, "solved");
        Ok(Solution {lightpaths:outcome.lightpaths,demands:outcome.demands,summary})
    }
}

// one x[p][s] (or x[p][c][s] per core) variable set to 1
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct IlpAssignment {
    pub entry:usize,
    pub core:Option<usize>,
    pub start_slot:usize,
}

// minimise   sum_p cost[p] * sum_{c,s} x[p][c][s]
// subject to sum_{p in demand_entries[d]} rate[p] * sum_{c,s} x[p][c][s] >= offered[d]      for every d
//            sum_{p in link_entries[e]} sum_{s' in (s-w_p, s]} x[p][c][s'] <= 1                for every e, c, s
//            x[p][c][s] = 0 for s > last_start_slot[p] or s + w_p > link_usable_slots[e], e on p
// c ranges over num_cores grids in core continuity mode, a single grid otherwise.
// the single shared grid is S*C columns wide with at most one lightpath per
// column, the same layout the heuristic and the verifier use. it is not the
// S columns with up to C lightpaths per column model, a backend must not
// rebuild that one, its answers would fail verification
pub struct IlpInstance<'a> {
    pub entries:&'a [CandidateEntry],
    pub offered_gbps:Vec<RateGbps>,
    pub demand_entries:Vec<Vec<usize>>,
    pub link_entries:Vec<Vec<usize>>,
    pub link_usable_slots:Vec<usize>,
    // None when the entry is wider than the grid
    pub last_start_slot:Vec<Option<usize>>,
    pub layout:GridLayout,
}

impl<'a> IlpInstance<'a> {
    pub fn new(network:&Network,demands:&[Demand],catalog:&'a PathCatalog,layout:GridLayout) -> Self {
        let entries = catalog.entries();
        let width = layout.grid_width();
        let mut demand_entries = vec![vec![];demands.len()];
        let mut link_entries = vec![vec![];network.links().len()];
        for entry in entries {
            if let Some(list) = demand_entries.get_mut(entry.demand) {list.push(entry.index)}
            for link in entry.path.iter() {
                if let Some(list) = link_entries.get_mut(*link) {list.push(entry.index)}
            }
        }
        Self {
            entries,
            offered_gbps:demands.iter().map(|d| d.offered_gbps).collect(),
            demand_entries,
            link_entries,
            link_usable_slots:network.links().iter().map(|l| layout.usable_width(l.slots_per_core)).collect(),
            last_start_slot:entries.iter().map(|e| width.checked_sub(e.num_slots)).collect(),
            layout,
        }
    }
    pub fn grid_count(&self) -> usize {
        self.layout.grid_count()
    }
    // objective value of a set of assignments
    pub fn cost(&self,assignments:&[IlpAssignment]) -> f64 {
        assignments.iter().filter_map(|a| self.entries.get(a.entry)).map(|e| e.cost).sum()
    }
}

// an external MILP solver; errors are reported as plain messages
pub trait IlpBackend {
    fn solve(&self,instance:&IlpInstance<'_>) -> Result<Vec<IlpAssignment>,String>;
}

pub struct ExactFormulation<B> {
    backend:B,
}

impl<B:IlpBackend> ExactFormulation<B> {
    pub fn new(backend:B) -> Self {
        Self {backend}
    }
}

impl<B:IlpBackend> RscaSolver for ExactFormulation<B> {
    fn name(&self) -> &'static str {
        "exact-formulation"
    }
    fn solve(&self,problem:&Problem<'_>) -> Result<Solution,RsaError> {
        problem.validate()?;
        let mut demands = problem.prepared_demands();
        let catalog = problem.build_catalog(&demands)?;
        let layout = problem.layout();
        let instance = IlpInstance::new(problem.network, &demands, &catalog, layout);
        let assignments = self.backend.solve(&instance).map_err(RsaError::Backend)?;

        let mut lightpaths = Vec::with_capacity(assignments.len());
        for a in assignments.iter() {
            let entry = catalog.entry(a.entry)
                .ok_or_else(|| RsaError::Backend(format!("assignment refers to unknown entry {}",a.entry)))?;
            let carried_gbps = demands[entry.demand].carry(entry.line_rate_gbps);
            lightpaths.push(Lightpath {
                id:lightpaths.len(),
                demand:entry.demand,
                path:entry.path.clone(),
                transponder:entry.transponder,
                core:a.core,
                start_slot:a.start_slot,
                num_slots:entry.num_slots,
                line_rate_gbps:entry.line_rate_gbps,
                carried_gbps,
            });
        }
        verify(problem.network, &lightpaths, layout)?;
        let summary = RunSummary::new(&demands, &lightpaths, 0, false);
        info!(solver = self.name(), cost = instance.cost(&assignments), %summary, "solved");
        Ok(Solution {lightpaths,demands,summary})
    }
}
