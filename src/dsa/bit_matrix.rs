use std::fmt::Display;
use thiserror::Error;

use crate::dsa::bitset::BitSet;

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum BitMatrixError {
    #[error("Matrix size is:{matrix_size:?},but index at {accessed_index:?} was accessed")]
    IndexOutOfBounds{matrix_size:(usize,usize),accessed_index:(usize,usize)},
    #[error("Matrix have {row_count} rows ,but row at {accessed_row} was accessed")]
    RowOutOfBounds{row_count:usize,accessed_row:usize},
    #[error("Window [{start},{start}+{width}) does not fit in a row of {col_count} cols")]
    WindowOutOfBounds{col_count:usize,start:usize,width:usize},
}

type Result<T> = std::result::Result<T,BitMatrixError>;

// A boolean matrix, row major order
// rows are links, cols are slots, so a whole link is one contiguous run of bits
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct BitMatrix {
    row_count:usize,
    col_count:usize,
    //row*col must equal bits.len()
    bits:BitSet
}

impl Display for BitMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.row_count {
            for col in 0..self.col_count {
                let occupied = self.bits.get_at(row*self.col_count + col).unwrap_or(false);
                write!(f,"{}",if occupied {'#'} else {'.'})?;
            }
            if row + 1 != self.row_count {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl BitMatrix {
    pub fn zeros(row:usize,col:usize) -> Self {
        if row*col == 0 {
            return Self::default()
        }
        Self {
            row_count:row,
            col_count:col,
            bits:BitSet::filled(row*col, false)
        }
    }
    pub fn is_empty(&self) -> bool {
        self.col_count == 0 || self.row_count == 0 || self.bits.is_empty()
    }
    pub fn dimension(&self) -> (usize,usize) {
        if self.is_empty() {return (0,0)}
        (self.row_count,self.col_count)
    }
    fn out_of_bounds(&self,row:usize,col:usize) -> BitMatrixError {
        BitMatrixError::IndexOutOfBounds {
            matrix_size:(self.row_count,self.col_count),
            accessed_index:(row,col)
        }
    }
    fn row_start(&self,row:usize) -> Result<usize> {
        if row >= self.row_count {
            return Err(BitMatrixError::RowOutOfBounds { row_count: self.row_count, accessed_row: row })
        }
        Ok(row*self.col_count)
    }
    fn window_start(&self,row:usize,start:usize,width:usize) -> Result<usize> {
        let row_start = self.row_start(row)?;
        if width == 0 || start.checked_add(width).is_none_or(|end| end > self.col_count) {
            return Err(BitMatrixError::WindowOutOfBounds { col_count: self.col_count, start, width })
        }
        Ok(row_start + start)
    }
    pub fn get(&self,row:usize,col:usize) -> Result<bool> {
        debug_assert_eq!(self.row_count*self.col_count,self.bits.len());
        if row >= self.row_count || col >= self.col_count {
            return Err(self.out_of_bounds(row, col))
        }
        self.bits.get_at(row*self.col_count + col).ok_or(self.out_of_bounds(row, col))
    }
    pub fn set(&mut self,row:usize,col:usize,bit:bool) -> Result<()> {
        debug_assert_eq!(self.row_count*self.col_count,self.bits.len());
        if row >= self.row_count || col >= self.col_count {
            return Err(self.out_of_bounds(row, col))
        }
        let error = self.out_of_bounds(row, col);
        self.bits.store_at(row*self.col_count + col, bit).ok_or(error)
    }
    // true if no col in [start,start+width) of the row is set
    pub fn is_window_clear(&self,row:usize,start:usize,width:usize) -> Result<bool> {
        Ok(self.last_occupied_in(row, start, width)?.is_none())
    }
    // highest set col inside the window, first fit uses it to skip ahead
    pub fn last_occupied_in(&self,row:usize,start:usize,width:usize) -> Result<Option<usize>> {
        let begin = self.window_start(row, start, width)?;
        let row_start = begin - start;
        let last = self.bits.last_set_in(begin..begin + width)
            .ok_or(self.out_of_bounds(row, start + width))?;
        Ok(last.map(|index| index - row_start))
    }
    pub fn fill_window(&mut self,row:usize,start:usize,width:usize) -> Result<()> {
        let begin = self.window_start(row, start, width)?;
        let error = self.out_of_bounds(row, start + width);
        self.bits.fill_range(begin..begin + width, true).ok_or(error)
    }
    // marks every col from `col` to the end of the row, a no-op if col is past the end
    pub fn mark_from(&mut self,row:usize,col:usize) -> Result<()> {
        let row_start = self.row_start(row)?;
        if col >= self.col_count {return Ok(())}
        let error = self.out_of_bounds(row, col);
        self.bits.fill_range(row_start + col..row_start + self.col_count, true).ok_or(error)
    }
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }
}
