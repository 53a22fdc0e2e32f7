use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::lightpath::Lightpath;
use super::topology::{Demand, DemandId, RateGbps};

// demands below this much blocked traffic count as satisfied
pub const BLOCKED_TRAFFIC_EPSILON_GBPS:RateGbps = 1e-3;

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct BlockedDemand {
    pub demand:DemandId,
    pub blocked_gbps:RateGbps,
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum RunStatus {
    AllServed,
    // the network ran out of spectrum (or rounds) before every demand was carried
    CapacityExceeded{demands:Vec<DemandId>},
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct RunSummary {
    pub throughput_gbps:RateGbps,
    pub occupied_slots:usize,
    pub offered_gbps:RateGbps,
    pub blocked:Vec<BlockedDemand>,
    pub rounds:usize,
    pub truncated:bool,
    pub status:RunStatus,
}

impl RunSummary {
    pub fn new(demands:&[Demand],lightpaths:&[Lightpath],rounds:usize,truncated:bool) -> Self {
        let blocked:Vec<BlockedDemand> = demands.iter().enumerate()
            .filter(|(_,d)| d.blocked_gbps() >= BLOCKED_TRAFFIC_EPSILON_GBPS)
            .map(|(demand,d)| BlockedDemand {demand,blocked_gbps:d.blocked_gbps()})
            .collect();
        let status = if blocked.is_empty() {
            RunStatus::AllServed
        }else{
            RunStatus::CapacityExceeded { demands: blocked.iter().map(|b| b.demand).collect() }
        };
        Self {
            throughput_gbps:lightpaths.iter().map(|lp| lp.carried_gbps).sum(),
            occupied_slots:lightpaths.iter().map(Lightpath::occupied_slots).sum(),
            offered_gbps:demands.iter().map(|d| d.offered_gbps).sum(),
            blocked,
            rounds,
            truncated,
            status,
        }
    }
    pub fn capacity_exceeded(&self) -> bool {
        matches!(self.status,RunStatus::CapacityExceeded { .. })
    }
    pub fn blocked_gbps(&self) -> RateGbps {
        self.blocked.iter().map(|b| b.blocked_gbps).sum()
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"Offered Traffic: {} - Throughput (Gbps): {} - Total FSOccupied : {}",
            self.offered_gbps,self.throughput_gbps,self.occupied_slots)?;
        if self.capacity_exceeded() {
            write!(f," - Maximum traffic limit reached ({} demands blocked)",self.blocked.len())?;
        }
        Ok(())
    }
}
