// greedy demand satisfaction:
// every round re-ranks demands by blocked ratio, serves the most starved
// demand with its most cost efficient feasible entry, then starts over.
// one lightpath per round, the run ends on a round that allocates nothing

use nohash::BuildNoHashHasher;
use tracing::{debug, info, warn};

use super::catalog::{CandidateEntry, PathCatalog};
use super::error::RsaError;
use super::grid::{Placement, SpectrumGrid};
use super::lightpath::{Lightpath, LightpathId};
use super::summary::BLOCKED_TRAFFIC_EPSILON_GBPS;
use super::topology::{Demand, DemandId};

type HashSet<K> = std::collections::hash_set::HashSet<K,BuildNoHashHasher<usize>>;

#[derive(Clone,Debug)]
pub struct ScheduleOutcome {
    pub demands:Vec<Demand>,
    // in creation order
    pub lightpaths:Vec<Lightpath>,
    pub rounds:usize,
    // stopped by the round budget rather than by running dry
    pub truncated:bool,
    pub grid:SpectrumGrid,
}

struct Choice<'a> {
    entry:&'a CandidateEntry,
    placement:Placement,
    metric:f64,
}

pub struct GreedyScheduler<'a> {
    catalog:&'a PathCatalog,
    grid:SpectrumGrid,
    demands:Vec<Demand>,
    lightpaths:Vec<Lightpath>,
    max_rounds:Option<usize>,
}

impl<'a> GreedyScheduler<'a> {
    // demands must be the ones the catalog was built from, in the same order
    pub fn new(catalog:&'a PathCatalog,grid:SpectrumGrid,demands:Vec<Demand>) -> Result<Self,RsaError> {
        if demands.is_empty() {return Err(RsaError::NoDemands)}
        if catalog.demand_count() != demands.len() {
            return Err(RsaError::InvalidConfig(format!(
                "catalog covers {} demands, scheduler was given {}",catalog.demand_count(),demands.len()
            )))
        }
        Ok(Self {catalog,grid,demands,lightpaths:vec![],max_rounds:None})
    }
    pub fn with_max_rounds(mut self,max_rounds:Option<usize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    // descending blocked ratio, lower index first on ties
    fn ranked_demands(&self) -> Vec<DemandId> {
        let ratios:Vec<f64> = self.demands.iter().map(Demand::blocked_ratio).collect();
        let mut order:Vec<DemandId> = (0..self.demands.len()).collect();
        order.sort_by(|a,b| ratios[*b].total_cmp(&ratios[*a]).then(a.cmp(b)));
        order
    }

    // feasible entry with the highest extra carried traffic per unit cost
    // strict comparison, so the first entry in catalog order wins ties
    fn best_choice(&self,demand:DemandId) -> Result<Option<Choice<'a>>,RsaError> {
        let catalog = self.catalog;
        let blocked = self.demands[demand].blocked_gbps();
        let mut best:Option<Choice<'a>> = None;
        for entry in catalog.entries_for(demand) {
            let Some(placement) = self.grid.find_window(&entry.path, entry.num_slots)? else {continue};
            let metric = blocked.min(entry.line_rate_gbps) / entry.cost;
            if best.as_ref().is_none_or(|b| metric > b.metric) {
                best = Some(Choice {entry,placement,metric});
            }
        }
        Ok(best)
    }

    fn establish(&mut self,choice:Choice<'a>) -> Result<LightpathId,RsaError> {
        let Choice {entry,placement,metric} = choice;
        self.grid.allocate_placement(placement, &entry.path, entry.num_slots)?;
        let carried_gbps = self.demands[entry.demand].carry(entry.line_rate_gbps);
        let id = self.lightpaths.len();
        self.lightpaths.push(Lightpath {
            id,
            demand:entry.demand,
            path:entry.path.clone(),
            transponder:entry.transponder,
            core:placement.core,
            start_slot:placement.start_slot,
            num_slots:entry.num_slots,
            line_rate_gbps:entry.line_rate_gbps,
            carried_gbps,
        });
        debug!(
            lightpath = id, demand = entry.demand, entry = entry.index,
            core = ?placement.core, start_slot = placement.start_slot,
            slots = entry.num_slots, metric, "lightpath established"
        );
        Ok(id)
    }

    // one pass over the ranked demands, at most one allocation
    // excluded demands are satisfied or had no feasible entry; occupancy only
    // grows, so they stay that way for the rest of the run
    fn round(&mut self,excluded:&mut HashSet<DemandId>) -> Result<Option<LightpathId>,RsaError> {
        for demand in self.ranked_demands() {
            if excluded.contains(&demand) {continue}
            if self.demands[demand].blocked_gbps() < BLOCKED_TRAFFIC_EPSILON_GBPS {
                excluded.insert(demand);
                continue;
            }
            match self.best_choice(demand)? {
                Some(choice) => return Ok(Some(self.establish(choice)?)),
                None => {
                    debug!(demand, "no feasible entry left, demand excluded");
                    excluded.insert(demand);
                }
            }
        }
        Ok(None)
    }

    pub fn run(mut self) -> Result<ScheduleOutcome,RsaError> {
        let mut excluded:HashSet<DemandId> = HashSet::with_capacity_and_hasher(
            self.demands.len(), BuildNoHashHasher::default()
        );
        let mut rounds = 0;
        let mut truncated = false;
        loop {
            if self.max_rounds.is_some_and(|max| rounds >= max) {
                truncated = true;
                break;
            }
            if self.round(&mut excluded)?.is_none() {break}
            rounds += 1;
        }

        let blocked = self.demands.iter()
            .filter(|d| d.blocked_gbps() >= BLOCKED_TRAFFIC_EPSILON_GBPS).count();
        info!(rounds, lightpaths = self.lightpaths.len(), truncated, "greedy allocation finished");
        if blocked > 0 {
            warn!(blocked, "capacity exceeded, demands left with blocked traffic");
        }
        Ok(ScheduleOutcome {
            demands:self.demands,
            lightpaths:self.lightpaths,
            rounds,
            truncated,
            grid:self.grid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{GreedyScheduler, ScheduleOutcome};
    use crate::optical_network::catalog::{CatalogOptions, PathCatalog};
    use crate::optical_network::error::RsaError;
    use crate::optical_network::grid::{GridLayout, SpectrumGrid};
    use crate::optical_network::summary::BLOCKED_TRAFFIC_EPSILON_GBPS;
    use crate::optical_network::topology::{Demand, Network, PathTable};
    use crate::optical_network::transponder::{TransponderCatalog, TransponderType};
    use crate::optical_network::verifier::verify;

    fn transponder(rate:f64,cost:f64,slots:usize) -> TransponderType {
        TransponderType {id:0,line_rate_gbps:rate,cost,num_slots:slots,optical_reach_km:-1.0}
    }

    // one fiber 0 -> 1, every demand runs over it
    fn single_link(slots:usize) -> (Network,PathTable) {
        let mut net = Network::new(2);
        let link = net.add_link(0, 1, 80.0, slots).unwrap();
        let mut table = PathTable::new();
        table.insert(0, 1, vec![link]);
        (net,table)
    }

    fn schedule(net:&Network,table:&PathTable,demands:Vec<Demand>,types:Vec<TransponderType>,layout:GridLayout) -> ScheduleOutcome {
        let transponders = TransponderCatalog::new(types).unwrap();
        let options = CatalogOptions {max_paths_per_pair:5,max_path_length_km:None};
        let catalog = PathCatalog::build(net, &demands, table, &transponders, options).unwrap();
        let grid = SpectrumGrid::new(net, layout).unwrap();
        let outcome = GreedyScheduler::new(&catalog, grid, demands).unwrap().run().unwrap();
        verify(net, &outcome.lightpaths, layout).unwrap();
        outcome
    }

    fn single_core(slots:usize,core_continuity:bool) -> GridLayout {
        GridLayout {num_cores:1,slots_per_core:slots,core_continuity}
    }

    #[test]
    fn test_single_demand_single_lightpath() {
        let (net,table) = single_link(4);
        let outcome = schedule(&net, &table, vec![Demand::new(0, 0, 1, 100.0)],
            vec![transponder(100.0, 1.0, 2)], single_core(4, true));
        assert_eq!(outcome.lightpaths.len(),1);
        let lp = &outcome.lightpaths[0];
        assert_eq!((lp.start_slot,lp.end_slot(),lp.core),(0,2,Some(0)));
        assert!(outcome.demands[0].blocked_gbps() < BLOCKED_TRAFFIC_EPSILON_GBPS);
        assert_eq!(outcome.rounds,1);
        assert!(!outcome.truncated);
    }
    #[test]
    fn test_second_demand_blocked_by_fragment() {
        let (net,table) = single_link(3);
        let demands = vec![Demand::new(0, 0, 1, 100.0),Demand::new(1, 0, 1, 100.0)];
        let outcome = schedule(&net, &table, demands, vec![transponder(100.0, 1.0, 2)], single_core(3, false));
        assert_eq!(outcome.lightpaths.len(),1);
        assert_eq!(outcome.lightpaths[0].demand,0);
        assert_eq!(outcome.lightpaths[0].start_slot,0);
        assert_eq!(outcome.lightpaths[0].core,None);
        assert_eq!(outcome.demands[1].blocked_gbps(),100.0);
    }
    #[test]
    fn test_core_continuity_takes_lowest_core() {
        let (net,table) = single_link(2);
        let layout = GridLayout {num_cores:2,slots_per_core:2,core_continuity:true};
        let outcome = schedule(&net, &table, vec![Demand::new(0, 0, 1, 200.0)],
            vec![transponder(100.0, 1.0, 2)], layout);
        let cores:Vec<Option<usize>> = outcome.lightpaths.iter().map(|lp| lp.core).collect();
        assert_eq!(cores,vec![Some(0),Some(1)]);
        assert!(outcome.lightpaths.iter().all(|lp| lp.start_slot == 0));
        assert_eq!(outcome.demands[0].carried_gbps(),200.0);
    }
    #[test]
    fn test_reranking_serves_most_starved() {
        let (net,table) = single_link(20);
        let demands = vec![Demand::new(0, 0, 1, 300.0),Demand::new(1, 0, 1, 100.0)];
        let outcome = schedule(&net, &table, demands, vec![transponder(100.0, 1.0, 2)], single_core(20, false));
        let order:Vec<usize> = outcome.lightpaths.iter().map(|lp| lp.demand).collect();
        // equal ratios go by index, then demand 1 (ratio 1) beats demand 0 (ratio 2/3)
        assert_eq!(order,vec![0,1,0,0]);
        let starts:Vec<usize> = outcome.lightpaths.iter().map(|lp| lp.start_slot).collect();
        assert_eq!(starts,vec![0,2,4,6]);
    }
    #[test]
    fn test_metric_prefers_cost_efficiency() {
        let (net,table) = single_link(20);
        let types = vec![transponder(100.0, 1.0, 2),transponder(400.0, 2.5, 4)];
        // 400 blocked: 100/1 against 400/2.5
        let outcome = schedule(&net, &table, vec![Demand::new(0, 0, 1, 400.0)], types.clone(), single_core(20, true));
        assert_eq!(outcome.lightpaths.len(),1);
        assert_eq!(outcome.lightpaths[0].transponder,1);
        // 100 blocked: 100/1 against 100/2.5
        let outcome = schedule(&net, &table, vec![Demand::new(0, 0, 1, 100.0)], types, single_core(20, true));
        assert_eq!(outcome.lightpaths[0].transponder,0);
    }
    #[test]
    fn test_metric_tie_goes_to_first_entry() {
        let (net,table) = single_link(20);
        let types = vec![transponder(100.0, 1.0, 3),transponder(100.0, 1.0, 2)];
        let outcome = schedule(&net, &table, vec![Demand::new(0, 0, 1, 100.0)], types, single_core(20, true));
        assert_eq!(outcome.lightpaths[0].transponder,0);
        assert_eq!(outcome.lightpaths[0].num_slots,3);
    }
    #[test]
    fn test_falls_back_to_narrower_entry() {
        let (net,table) = single_link(3);
        // the wide type is preferred but never fits, the narrow one carries everything
        let types = vec![transponder(400.0, 1.0, 4),transponder(100.0, 1.0, 1)];
        let outcome = schedule(&net, &table, vec![Demand::new(0, 0, 1, 300.0)], types, single_core(3, true));
        assert_eq!(outcome.lightpaths.len(),3);
        assert!(outcome.lightpaths.iter().all(|lp| lp.transponder == 1));
        assert_eq!(outcome.demands[0].carried_gbps(),300.0);
    }
    #[test]
    fn test_partial_line_rate_never_over_carries() {
        let (net,table) = single_link(10);
        let outcome = schedule(&net, &table, vec![Demand::new(0, 0, 1, 150.0)],
            vec![transponder(100.0, 1.0, 2)], single_core(10, false));
        assert_eq!(outcome.lightpaths.len(),2);
        assert_eq!(outcome.lightpaths[1].carried_gbps,50.0);
        assert_eq!(outcome.demands[0].carried_gbps(),150.0);
    }
    #[test]
    fn test_round_budget() {
        let (net,table) = single_link(20);
        let demands = vec![Demand::new(0, 0, 1, 500.0)];
        let transponders = TransponderCatalog::new(vec![transponder(100.0, 1.0, 2)]).unwrap();
        let options = CatalogOptions {max_paths_per_pair:1,max_path_length_km:None};
        let catalog = PathCatalog::build(&net, &demands, &table, &transponders, options).unwrap();
        let grid = SpectrumGrid::new(&net, single_core(20, false)).unwrap();
        let outcome = GreedyScheduler::new(&catalog, grid, demands).unwrap()
            .with_max_rounds(Some(2)).run().unwrap();
        assert_eq!(outcome.rounds,2);
        assert!(outcome.truncated);
        assert_eq!(outcome.demands[0].carried_gbps(),200.0);
    }
    #[test]
    fn test_deterministic() {
        let mut net = Network::new(4);
        let mut table = PathTable::new();
        let a = net.add_link(0, 1, 100.0, 12).unwrap();
        let b = net.add_link(1, 2, 100.0, 12).unwrap();
        let c = net.add_link(2, 3, 100.0, 8).unwrap();
        let d = net.add_link(0, 3, 450.0, 12).unwrap();
        table.insert(0, 3, vec![a,b,c]);
        table.insert(0, 3, vec![d]);
        table.insert(1, 3, vec![b,c]);
        table.insert(0, 2, vec![a,b]);
        let demands = vec![
            Demand::new(0, 0, 3, 700.0),Demand::new(1, 1, 3, 300.0),Demand::new(2, 0, 2, 500.0),
        ];
        let types = vec![transponder(100.0, 1.0, 2),transponder(200.0, 1.5, 3)];
        let layout = GridLayout {num_cores:2,slots_per_core:12,core_continuity:true};
        let first = schedule(&net, &table, demands.clone(), types.clone(), layout);
        let second = schedule(&net, &table, demands, types, layout);
        assert!(!first.lightpaths.is_empty());
        assert_eq!(first.lightpaths,second.lightpaths);
        assert_eq!(first.demands,second.demands);
    }
    #[test]
    fn test_catalog_mismatch() {
        let (net,table) = single_link(4);
        let demands = vec![Demand::new(0, 0, 1, 100.0)];
        let transponders = TransponderCatalog::new(vec![transponder(100.0, 1.0, 2)]).unwrap();
        let options = CatalogOptions {max_paths_per_pair:1,max_path_length_km:None};
        let catalog = PathCatalog::build(&net, &demands, &table, &transponders, options).unwrap();
        let grid = SpectrumGrid::new(&net, single_core(4, false)).unwrap();
        let more = vec![Demand::new(0, 0, 1, 1.0),Demand::new(1, 0, 1, 1.0)];
        assert!(matches!(GreedyScheduler::new(&catalog, grid.clone(), more),Err(RsaError::InvalidConfig(_))));
        assert!(matches!(GreedyScheduler::new(&catalog, grid, vec![]),Err(RsaError::NoDemands)));
    }
}
