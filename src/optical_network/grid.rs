// spectrum occupancy, one links x slots bit matrix per core
// (core continuity), or a single matrix of cores*slots per link (shared)

use serde::{Deserialize, Serialize};

use crate::dsa::bit_matrix::BitMatrix;
use super::error::GridError;
use super::topology::{LinkId, Network};

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct GridLayout {
    pub num_cores:usize,
    pub slots_per_core:usize,
    pub core_continuity:bool,
}

impl GridLayout {
    pub fn grid_count(&self) -> usize {
        if self.core_continuity {self.num_cores} else {1}
    }
    // slots per link in one grid
    pub fn grid_width(&self) -> usize {
        if self.core_continuity {self.slots_per_core} else {self.slots_per_core*self.num_cores}
    }
    // usable slots of a link in one grid, anything above is pre-marked
    pub fn usable_width(&self,advertised_per_core:usize) -> usize {
        let per_core = advertised_per_core.min(self.slots_per_core);
        if self.core_continuity {per_core} else {per_core*self.num_cores}
    }
}

// where a window was found; core is None on the shared grid
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Placement {
    pub core:Option<usize>,
    pub start_slot:usize,
}

#[derive(Clone,Debug)]
pub struct SpectrumGrid {
    layout:GridLayout,
    grids:Vec<BitMatrix>,
    seeded:usize,
}

impl SpectrumGrid {
    // slots at or beyond each link's advertised capacity start occupied
    pub fn new(network:&Network,layout:GridLayout) -> Result<Self,GridError> {
        let links = network.links().len();
        let mut grids = Vec::with_capacity(layout.grid_count());
        for _ in 0..layout.grid_count() {
            let mut grid = BitMatrix::zeros(links, layout.grid_width());
            for (row,link) in network.links().iter().enumerate() {
                grid.mark_from(row, layout.usable_width(link.slots_per_core))?;
            }
            grids.push(grid);
        }
        let seeded = grids.iter().map(BitMatrix::count_ones).sum();
        Ok(Self {layout,grids,seeded})
    }
    pub fn layout(&self) -> GridLayout {
        self.layout
    }
    fn grid(&self,core:usize) -> Result<&BitMatrix,GridError> {
        let core_count = self.grids.len();
        self.grids.get(core).ok_or(GridError::UnknownCore { core, core_count })
    }
    fn check_path(&self,grid:&BitMatrix,path:&[LinkId]) -> Result<(),GridError> {
        let (links,_) = grid.dimension();
        match path.iter().find(|link| **link >= links) {
            Some(link) => Err(GridError::UnknownLink(*link)),
            None => Ok(())
        }
    }
    // lowest start slot whose window is free on every link of the path
    pub fn first_fit(&self,core:usize,path:&[LinkId],width:usize) -> Result<Option<usize>,GridError> {
        let grid = self.grid(core)?;
        self.check_path(grid, path)?;
        let grid_width = self.layout.grid_width();
        if width == 0 || width > grid_width || path.is_empty() {return Ok(None)}

        let mut start = 0;
        'windows: while start + width <= grid_width {
            for link in path {
                if let Some(occupied) = grid.last_occupied_in(*link, start, width)? {
                    // every window starting at or before `occupied` overlaps it
                    start = occupied + 1;
                    continue 'windows;
                }
            }
            return Ok(Some(start));
        }
        Ok(None)
    }
    // shared grid, or the lowest indexed core with a free window
    pub fn find_window(&self,path:&[LinkId],width:usize) -> Result<Option<Placement>,GridError> {
        if !self.layout.core_continuity {
            let start = self.first_fit(0, path, width)?;
            return Ok(start.map(|start_slot| Placement {core:None,start_slot}));
        }
        for core in 0..self.grids.len() {
            if let Some(start_slot) = self.first_fit(core, path, width)? {
                return Ok(Some(Placement {core:Some(core),start_slot}));
            }
        }
        Ok(None)
    }
    // refuses windows that are not entirely free, leaving the grid untouched
    pub fn allocate(&mut self,core:usize,path:&[LinkId],start_slot:usize,width:usize) -> Result<(),GridError> {
        let grid = self.grid(core)?;
        self.check_path(grid, path)?;
        for link in path {
            if !grid.is_window_clear(*link, start_slot, width)? {
                return Err(GridError::WindowOccupied { link: *link, start: start_slot, width })
            }
        }
        let grid = &mut self.grids[core];
        for link in path {
            grid.fill_window(*link, start_slot, width)?;
        }
        Ok(())
    }
    pub fn allocate_placement(&mut self,placement:Placement,path:&[LinkId],width:usize) -> Result<(),GridError> {
        self.allocate(placement.core.unwrap_or(0), path, placement.start_slot, width)
    }
    pub fn is_occupied(&self,core:usize,link:LinkId,slot:usize) -> Result<bool,GridError> {
        Ok(self.grid(core)?.get(link, slot)?)
    }
    // cells taken by allocations, pre-seeded capacity excluded
    pub fn occupied_cells(&self) -> usize {
        self.grids.iter().map(BitMatrix::count_ones).sum::<usize>() - self.seeded
    }
}
