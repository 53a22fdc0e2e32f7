use std::ops::Range;

// packed bits, bit i lives in bytes[i/8] at position i%8
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub(crate) struct BitSet {
    size:usize,
    bytes:Vec<u8>
}

impl BitSet {
    pub(crate) fn new() -> Self {
        Self {size:0,bytes:vec![]}
    }
    pub(crate) fn filled(len:usize,bit:bool) -> Self {
        if len == 0 {return Self::new()}
        let mut bytes = vec![if bit {u8::MAX} else {0};len.div_ceil(8)];
        // keep the unused tail of the last byte cleared, count_ones relies on it
        let tail = len % 8;
        if bit && tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last = (1u8 << tail) - 1;
            }
        }
        Self {size:len,bytes}
    }
    pub(crate) fn len(&self) -> usize {
        self.size
    }
    pub(crate) fn is_empty(&self) -> bool {
        self.size == 0
    }
    pub(crate) fn get_at(&self,index:usize) -> Option<bool> {
        if index >= self.size {return None}
        let byte = self.bytes.get(index / 8)?;
        let mask = 1u8 << (index % 8);
        Some(*byte & mask > 0)
    }
    pub(crate) fn store_at(&mut self,index:usize,bit:bool) -> Option<()> {
        if index >= self.size {return None}
        let byte = self.bytes.get_mut(index / 8)?;
        let mask = 1u8 << (index % 8);
        if bit {
            *byte |= mask;
        }else{
            *byte &= !mask;
        }
        Some(())
    }
    fn check_range(&self,range:&Range<usize>) -> Option<()> {
        if range.start > range.end || range.end > self.size {return None}
        Some(())
    }
    pub(crate) fn fill_range(&mut self,range:Range<usize>,bit:bool) -> Option<()> {
        self.check_range(&range)?;
        for index in range {
            self.store_at(index, bit)?;
        }
        Some(())
    }
    // outer None: range out of bounds, inner None: no bit set in range
    pub(crate) fn last_set_in(&self,range:Range<usize>) -> Option<Option<usize>> {
        self.check_range(&range)?;
        for index in range.rev() {
            if self.get_at(index)? {
                return Some(Some(index));
            }
        }
        Some(None)
    }
    pub(crate) fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests{
    use super::BitSet;
    #[test]
    fn test_create() {
        assert!(BitSet::new().is_empty());
        let mut set = BitSet::filled(114514, true);
        assert!(set.get_at(10000).unwrap());
        assert!(set.get_at(114513).unwrap());
        assert_eq!(set.count_ones(),114514);
        let bit = false;
        set.store_at(1145, bit).unwrap();
        assert_eq!(set.get_at(1145).unwrap(),bit);
        assert_eq!(set.count_ones(),114513);
        assert!(set.get_at(114514).is_none());
        assert!(set.store_at(114514, true).is_none());
    }
    #[test]
    fn test_store_does_not_leak_into_next_bits() {
        let mut set = BitSet::filled(3, false);
        set.store_at(0, true).unwrap();
        assert_eq!(set.count_ones(),1);
        assert_eq!(set.get_at(1),Some(false));
    }
    #[test]
    fn test_filled_tail() {
        let set = BitSet::filled(13, true);
        assert_eq!(set.len(),13);
        assert_eq!(set.count_ones(),13);
        assert!(BitSet::filled(0, true).is_empty());
    }
    #[test]
    fn test_ranges() {
        let mut set = BitSet::filled(20, false);
        set.fill_range(4..7, true).unwrap();
        assert_eq!(set.last_set_in(0..4),Some(None));
        assert_eq!(set.last_set_in(3..5),Some(Some(4)));
        assert_eq!(set.last_set_in(0..20),Some(Some(6)));
        assert_eq!(set.last_set_in(7..20),Some(None));
        assert!(set.fill_range(18..21, true).is_none());
        assert!(set.last_set_in(0..21).is_none());
        assert_eq!(set.count_ones(),3);
    }
}
