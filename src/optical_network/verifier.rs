// independent audit of a finished allocation: rebuilds occupancy from the
// lightpaths alone and reports the first cell claimed twice.
// shares nothing with the scheduler's grid, it never repairs anything

use thiserror::Error;

use super::grid::GridLayout;
use super::lightpath::{Lightpath, LightpathId};
use super::topology::{LinkId, Network};

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum VerificationError {
    #[error("Spectrum clash on link {link}, core {core:?}, slot {slot}: lightpaths {first} and {second}")]
    ClashDetected{link:LinkId,core:Option<usize>,slot:usize,first:LightpathId,second:LightpathId},
    #[error("Lightpath {lightpath} uses slot {slot} on link {link}, core {core:?}, beyond the link capacity")]
    BeyondCapacity{lightpath:LightpathId,link:LinkId,core:Option<usize>,slot:usize},
    #[error("Lightpath {lightpath} has no core although core continuity is enforced")]
    MissingCore{lightpath:LightpathId},
    #[error("Lightpath {lightpath} is tagged with core {core} on a shared grid")]
    UnexpectedCore{lightpath:LightpathId,core:usize},
    #[error("Lightpath {lightpath} is on core {core}, the fiber has {num_cores}")]
    CoreOutOfRange{lightpath:LightpathId,core:usize,num_cores:usize},
    #[error("Lightpath {lightpath} occupies no slots")]
    EmptyWindow{lightpath:LightpathId},
    #[error("Lightpath {lightpath} traverses unknown link {link}")]
    UnknownLink{lightpath:LightpathId,link:LinkId},
}

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
enum Cell {
    Free,
    // above the link's advertised capacity
    Reserved,
    Taken(LightpathId),
}

struct Occupancy {
    width:usize,
    // grids[g][link*width + slot]
    grids:Vec<Vec<Cell>>,
}

impl Occupancy {
    fn new(network:&Network,layout:GridLayout) -> Self {
        let width = layout.grid_width();
        let links = network.links().len();
        let mut grid = vec![Cell::Free;links*width];
        for (index,link) in network.links().iter().enumerate() {
            let usable = layout.usable_width(link.slots_per_core).min(width);
            let row = index*width;
            for cell in &mut grid[row + usable..row + width] {
                *cell = Cell::Reserved;
            }
        }
        Self {width,grids:vec![grid;layout.grid_count()]}
    }
}

fn grid_index(lp:&Lightpath,layout:GridLayout) -> Result<usize,VerificationError> {
    match (layout.core_continuity,lp.core) {
        (true,Some(core)) if core < layout.num_cores => Ok(core),
        (true,Some(core)) => Err(VerificationError::CoreOutOfRange { lightpath: lp.id, core, num_cores: layout.num_cores }),
        (true,None) => Err(VerificationError::MissingCore { lightpath: lp.id }),
        (false,Some(core)) => Err(VerificationError::UnexpectedCore { lightpath: lp.id, core }),
        (false,None) => Ok(0),
    }
}

// shared grid clashes are reported with core None, the shared grid does not
// attribute a lightpath to a physical core
pub fn verify(network:&Network,lightpaths:&[Lightpath],layout:GridLayout) -> Result<(),VerificationError> {
    let mut occupancy = Occupancy::new(network, layout);
    let links = network.links().len();
    let width = occupancy.width;

    for lp in lightpaths {
        let g = grid_index(lp, layout)?;
        if lp.num_slots == 0 {
            return Err(VerificationError::EmptyWindow { lightpath: lp.id })
        }
        let grid = &mut occupancy.grids[g];
        for link in lp.path.iter().copied() {
            if link >= links {
                return Err(VerificationError::UnknownLink { lightpath: lp.id, link })
            }
            if lp.start_slot >= width {
                return Err(VerificationError::BeyondCapacity { lightpath: lp.id, link, core: lp.core, slot: lp.start_slot })
            }
            for slot in lp.start_slot..lp.end_slot() {
                let beyond = VerificationError::BeyondCapacity { lightpath: lp.id, link, core: lp.core, slot };
                if slot >= width {return Err(beyond)}
                let cell = &mut grid[link*width + slot];
                match *cell {
                    Cell::Free => *cell = Cell::Taken(lp.id),
                    Cell::Reserved => return Err(beyond),
                    Cell::Taken(first) => return Err(VerificationError::ClashDetected {
                        link, core: lp.core, slot, first, second: lp.id
                    }),
                }
            }
        }
    }
    Ok(())
}
