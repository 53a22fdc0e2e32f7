use tracing::debug;

use super::error::RsaError;
use super::topology::{CandidatePathSource, Demand, DemandId, DistanceKM, LinkId, Network, RateGbps};
use super::transponder::TransponderCatalog;

// one (demand, path, transponder) pairing, read only once built
#[derive(Clone,Debug,PartialEq)]
pub struct CandidateEntry {
    pub index:usize,
    pub demand:DemandId,
    pub path:Vec<LinkId>,
    pub length_km:DistanceKM,
    pub transponder:usize,
    pub cost:f64,
    pub line_rate_gbps:RateGbps,
    pub num_slots:usize,
}

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct CatalogOptions {
    pub max_paths_per_pair:usize,
    // propagation delay cap turned into a length, None = unlimited
    pub max_path_length_km:Option<DistanceKM>,
}

#[derive(Clone,Debug,Default)]
pub struct PathCatalog {
    entries:Vec<CandidateEntry>,
    // by_demand[d] holds indexes into entries, in enumeration order
    by_demand:Vec<Vec<usize>>
}

impl PathCatalog {
    pub fn build<P>(network:&Network,demands:&[Demand],paths:&P,transponders:&TransponderCatalog,options:CatalogOptions) -> Result<Self,RsaError>
        where P:CandidatePathSource + ?Sized
    {
        let mut entries = vec![];
        let mut by_demand = Vec::with_capacity(demands.len());

        for (demand,d) in demands.iter().enumerate() {
            let candidates = admissible_paths(network, paths, d, options)?;
            let mut this_demand = Vec::with_capacity(candidates.len()*transponders.len());
            for t in transponders.types() {
                for (path,length_km) in candidates.iter() {
                    // sorted by length, nothing further down fits either
                    if !t.reaches(*length_km) {break}
                    let index = entries.len();
                    entries.push(CandidateEntry {
                        index,
                        demand,
                        path:path.clone(),
                        length_km:*length_km,
                        transponder:t.id,
                        cost:t.cost,
                        line_rate_gbps:t.line_rate_gbps,
                        num_slots:t.num_slots,
                    });
                    this_demand.push(index);
                }
            }
            if this_demand.is_empty() {
                return Err(RsaError::NoFeasiblePath { demand })
            }
            by_demand.push(this_demand);
        }
        debug!(entries = entries.len(), demands = demands.len(), "candidate catalog built");
        Ok(Self {entries,by_demand})
    }
    pub fn entries(&self) -> &[CandidateEntry] {
        &self.entries
    }
    pub fn entry(&self,index:usize) -> Option<&CandidateEntry> {
        self.entries.get(index)
    }
    pub fn entries_for(&self,demand:DemandId) -> impl Iterator<Item = &CandidateEntry> {
        self.by_demand.get(demand).into_iter().flatten().filter_map(|index| self.entries.get(*index))
    }
    pub fn demand_count(&self) -> usize {
        self.by_demand.len()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// paths for the demand's node pair with their lengths: shortest first,
// delay capped, then truncated to k
fn admissible_paths<P>(network:&Network,paths:&P,demand:&Demand,options:CatalogOptions) -> Result<Vec<(Vec<LinkId>,DistanceKM)>,RsaError>
    where P:CandidatePathSource + ?Sized
{
    let mut measured = vec![];
    for path in paths.candidate_paths(demand.ingress, demand.egress) {
        if path.is_empty() {continue}
        let length_km = network.path_length_km(&path)?;
        measured.push((path,length_km));
    }
    // stable, equal lengths keep the source's order
    measured.sort_by(|a,b| a.1.total_cmp(&b.1));
    if let Some(limit) = options.max_path_length_km {
        measured.retain(|(_,length_km)| *length_km <= limit);
    }
    measured.truncate(options.max_paths_per_pair);
    Ok(measured)
}
