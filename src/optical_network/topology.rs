use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::RsaError;

pub type NodeId = usize;
pub type LinkId = usize;
pub type DemandId = usize;

pub type DistanceKM = f64;
pub type RateGbps = f64;

// a single fiber, every core on it carries slots_per_core slots
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct Link {
    pub id:LinkId,
    pub from:NodeId,
    pub to:NodeId,
    pub length_km:DistanceKM,
    pub slots_per_core:usize,
}

#[derive(Clone,Debug,Default,PartialEq,Serialize,Deserialize)]
pub struct Network {
    node_count:usize,
    links:Vec<Link>
}

impl Network {
    pub fn new(node_count:usize) -> Self {
        Self {node_count,links:vec![]}
    }
    pub fn node_count(&self) -> usize {
        self.node_count
    }
    pub fn links(&self) -> &[Link] {
        &self.links
    }
    pub fn link(&self,id:LinkId) -> Result<&Link,RsaError> {
        self.links.get(id).ok_or(RsaError::UnknownLink(id))
    }
    pub fn is_empty(&self) -> bool {
        self.node_count == 0 || self.links.is_empty()
    }
    // the new link's id is its position
    pub fn add_link(&mut self,from:NodeId,to:NodeId,length_km:DistanceKM,slots_per_core:usize) -> Result<LinkId,RsaError> {
        for node in [from,to] {
            if node >= self.node_count {return Err(RsaError::UnknownNode(node))}
        }
        if !length_km.is_finite() || length_km < 0.0 {
            return Err(RsaError::InvalidLink { link: self.links.len(), length_km })
        }
        let id = self.links.len();
        self.links.push(Link {id,from,to,length_km,slots_per_core});
        Ok(id)
    }
    // adds from->to and to->from, returns both ids in that order
    pub fn add_fiber_pair(&mut self,a:NodeId,b:NodeId,length_km:DistanceKM,slots_per_core:usize) -> Result<(LinkId,LinkId),RsaError> {
        let forward = self.add_link(a, b, length_km, slots_per_core)?;
        let backward = self.add_link(b, a, length_km, slots_per_core)?;
        Ok((forward,backward))
    }
    pub fn path_length_km(&self,path:&[LinkId]) -> Result<DistanceKM,RsaError> {
        let mut length = 0.0;
        for id in path {
            length += self.link(*id)?.length_km;
        }
        Ok(length)
    }
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct Demand {
    pub id:DemandId,
    pub ingress:NodeId,
    pub egress:NodeId,
    pub offered_gbps:RateGbps,
    #[serde(default)]
    carried_gbps:RateGbps,
}

impl Demand {
    pub fn new(id:DemandId,ingress:NodeId,egress:NodeId,offered_gbps:RateGbps) -> Self {
        Self {id,ingress,egress,offered_gbps,carried_gbps:0.0}
    }
    pub fn carried_gbps(&self) -> RateGbps {
        self.carried_gbps
    }
    pub fn blocked_gbps(&self) -> RateGbps {
        (self.offered_gbps - self.carried_gbps).max(0.0)
    }
    pub fn blocked_ratio(&self) -> f64 {
        if self.offered_gbps <= 0.0 {return 0.0}
        self.blocked_gbps() / self.offered_gbps
    }
    // never carries more than offered
    pub(crate) fn carry(&mut self,rate:RateGbps) -> RateGbps {
        let extra = rate.min(self.blocked_gbps()).max(0.0);
        self.carried_gbps += extra;
        extra
    }
    pub(crate) fn reset(&mut self) {
        self.carried_gbps = 0.0;
    }
}

// rescales offered traffic so the total matches target_gbps
// keeps the traffic pattern, a zero matrix is left untouched
pub fn scale_offered_traffic(demands:&mut [Demand],target_gbps:RateGbps) {
    let total:RateGbps = demands.iter().map(|d| d.offered_gbps).sum();
    if total <= 0.0 || !target_gbps.is_finite() {return}
    let factor = target_gbps / total;
    for demand in demands.iter_mut() {
        demand.offered_gbps *= factor;
    }
}

// candidate paths for a node pair, shortest first
// typically backed by a k-shortest-path engine living outside this crate
pub trait CandidatePathSource {
    fn candidate_paths(&self,ingress:NodeId,egress:NodeId) -> Vec<Vec<LinkId>>;
}

impl<F> CandidatePathSource for F
    where F:Fn(NodeId,NodeId) -> Vec<Vec<LinkId>>
{
    fn candidate_paths(&self,ingress:NodeId,egress:NodeId) -> Vec<Vec<LinkId>> {
        self(ingress,egress)
    }
}

// precomputed paths per ordered node pair
#[derive(Clone,Debug,Default)]
pub struct PathTable {
    paths:BTreeMap<(NodeId,NodeId),Vec<Vec<LinkId>>>
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self,ingress:NodeId,egress:NodeId,path:Vec<LinkId>) {
        self.paths.entry((ingress,egress)).or_default().push(path);
    }
    pub fn len(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CandidatePathSource for PathTable {
    fn candidate_paths(&self,ingress:NodeId,egress:NodeId) -> Vec<Vec<LinkId>> {
        self.paths.get(&(ingress,egress)).cloned().unwrap_or_default()
    }
}
