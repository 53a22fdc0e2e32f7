use serde::{Deserialize, Serialize};

use super::topology::{DemandId, LinkId, RateGbps};

pub type LightpathId = usize;

// created once, never changed afterwards
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct Lightpath {
    pub id:LightpathId,
    pub demand:DemandId,
    pub path:Vec<LinkId>,
    pub transponder:usize,
    // Some in core continuity mode, None on the shared grid
    pub core:Option<usize>,
    pub start_slot:usize,
    pub num_slots:usize,
    pub line_rate_gbps:RateGbps,
    // min(blocked traffic when created, line rate)
    pub carried_gbps:RateGbps,
}

impl Lightpath {
    // saturates instead of wrapping on absurd start slots
    pub fn end_slot(&self) -> usize {
        self.start_slot.saturating_add(self.num_slots)
    }
    // slot cells over all traversed links
    pub fn occupied_slots(&self) -> usize {
        self.num_slots*self.path.len()
    }
}
