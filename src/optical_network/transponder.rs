use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::RsaError;
use super::topology::{DistanceKM, RateGbps};

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct TransponderType {
    pub id:usize,
    pub line_rate_gbps:RateGbps,
    pub cost:f64,
    // contiguous slots taken on every traversed link
    pub num_slots:usize,
    // non-positive means no reach limit
    pub optical_reach_km:DistanceKM,
}

impl TransponderType {
    pub fn is_reach_unlimited(&self) -> bool {
        self.optical_reach_km <= 0.0
    }
    pub fn reaches(&self,length_km:DistanceKM) -> bool {
        self.is_reach_unlimited() || length_km <= self.optical_reach_km
    }
    fn validate(&self) -> Result<(),RsaError> {
        let invalid = |reason| Err(RsaError::InvalidTransponder { id: self.id, reason });
        if !(self.line_rate_gbps.is_finite() && self.line_rate_gbps > 0.0) {
            return invalid("line rate must be positive")
        }
        if !(self.cost.is_finite() && self.cost > 0.0) {
            return invalid("cost must be positive")
        }
        if self.num_slots == 0 {
            return invalid("a transponder occupies at least one slot")
        }
        if self.optical_reach_km.is_nan() {
            return invalid("optical reach is not a number")
        }
        Ok(())
    }
}

// declaration order matters, the catalog scans types in this order
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct TransponderCatalog {
    types:Vec<TransponderType>
}

impl TransponderCatalog {
    // ids are reassigned to declaration positions
    pub fn new(types:Vec<TransponderType>) -> Result<Self,RsaError> {
        let mut types = types;
        for (index,t) in types.iter_mut().enumerate() {
            t.id = index;
            t.validate()?;
        }
        Ok(Self {types})
    }
    // crosstalk aware catalogs shipped for 7, 12 and 19 core fibers
    pub fn reference(num_cores:usize) -> Result<&'static Self,RsaError> {
        match num_cores {
            7 => Ok(&*MCF_7_CORES),
            12 => Ok(&*MCF_12_CORES),
            19 => Ok(&*MCF_19_CORES),
            other => Err(RsaError::UnsupportedCoreCount(other))
        }
    }
    pub fn types(&self) -> &[TransponderType] {
        &self.types
    }
    pub fn get(&self,id:usize) -> Option<&TransponderType> {
        self.types.get(id)
    }
    pub fn len(&self) -> usize {
        self.types.len()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
    // None if any type has unlimited reach
    pub fn max_optical_reach_km(&self) -> Option<DistanceKM> {
        let mut max = 0.0f64;
        for t in self.types.iter() {
            if t.is_reach_unlimited() {return None}
            max = max.max(t.optical_reach_km);
        }
        Some(max)
    }
}

// (line rate, cost, slots, reach)
type Row = (RateGbps,f64,usize,DistanceKM);

fn from_rows(rows:&[Row]) -> TransponderCatalog {
    let types = rows.iter().enumerate().map(|(id,&(line_rate_gbps,cost,num_slots,optical_reach_km))| {
        TransponderType {id,line_rate_gbps,cost,num_slots,optical_reach_km}
    }).collect();
    TransponderCatalog {types}
}

// more cores, more inter-core crosstalk, shorter reach for the same format
lazy_static! {
    static ref MCF_7_CORES:TransponderCatalog = from_rows(&[
        (100.0,1.0,3,5000.0),
        (200.0,1.5,3,2500.0),
        (300.0,2.0,4,1200.0),
        (400.0,2.5,4,600.0),
    ]);
    static ref MCF_12_CORES:TransponderCatalog = from_rows(&[
        (100.0,1.0,3,4000.0),
        (200.0,1.5,3,2000.0),
        (300.0,2.0,4,900.0),
        (400.0,2.5,4,400.0),
    ]);
    static ref MCF_19_CORES:TransponderCatalog = from_rows(&[
        (100.0,1.0,3,3000.0),
        (200.0,1.5,3,1400.0),
        (300.0,2.0,4,600.0),
        (400.0,2.5,5,300.0),
    ]);
}

#[derive(Error,Debug,Clone,PartialEq)]
pub enum TransponderParseError {
    #[error("Transponder entry {entry} has {found} fields, expected 4 or 5")]
    FieldCount{entry:usize,found:usize},
    #[error("Transponder entry {entry} field {field} ({value:?}) is not a number")]
    BadNumber{entry:usize,field:usize,value:String},
    #[error(transparent)]
    Invalid(#[from] RsaError),
}

// "rate cost slots reach [regenCost]; ..." regenerator cost is read but unused
impl FromStr for TransponderCatalog {
    type Err = TransponderParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut types = vec![];
        for (entry,chunk) in s.split(';').map(str::trim).filter(|c| !c.is_empty()).enumerate() {
            let fields:Vec<&str> = chunk.split_whitespace().collect();
            if fields.len() != 4 && fields.len() != 5 {
                return Err(TransponderParseError::FieldCount { entry, found: fields.len() })
            }
            let number = |field:usize| -> Result<f64,TransponderParseError> {
                fields[field].parse::<f64>().map_err(|_| TransponderParseError::BadNumber {
                    entry,field,value:fields[field].to_string()
                })
            };
            let slots = number(2)?;
            if slots < 0.0 || slots.fract() != 0.0 {
                return Err(TransponderParseError::BadNumber { entry, field: 2, value: fields[2].to_string() })
            }
            if fields.len() == 5 {number(4)?;}
            types.push(TransponderType {
                id:entry,
                line_rate_gbps:number(0)?,
                cost:number(1)?,
                num_slots:slots as usize,
                optical_reach_km:number(3)?,
            });
        }
        Ok(Self::new(types)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{TransponderCatalog, TransponderParseError, TransponderType};
    use crate::optical_network::error::RsaError;

    #[test]
    fn test_reference_catalogs() {
        for cores in [7,12,19] {
            let catalog = TransponderCatalog::reference(cores).unwrap();
            assert!(!catalog.is_empty());
            for (index,t) in catalog.types().iter().enumerate() {
                assert_eq!(t.id,index);
                assert!(t.num_slots > 0 && t.cost > 0.0);
            }
        }
        let reach = |c| TransponderCatalog::reference(c).unwrap().max_optical_reach_km().unwrap();
        assert!(reach(7) > reach(12) && reach(12) > reach(19));
        assert_eq!(TransponderCatalog::reference(8),Err(RsaError::UnsupportedCoreCount(8)));
    }
    #[test]
    fn test_reach() {
        let t = TransponderType {id:0,line_rate_gbps:100.0,cost:1.0,num_slots:2,optical_reach_km:-1.0};
        assert!(t.reaches(1e9));
        let t = TransponderType {optical_reach_km:500.0,..t};
        assert!(t.reaches(500.0));
        assert!(!t.reaches(500.1));
    }
    #[test]
    fn test_parse() {
        let catalog:TransponderCatalog = "10 1 1 4000 1; 40 2 2 5000 1; 100 3 3 -1;".parse().unwrap();
        assert_eq!(catalog.len(),3);
        assert_eq!(catalog.get(1).unwrap().line_rate_gbps,40.0);
        assert_eq!(catalog.get(2).unwrap().num_slots,3);
        assert_eq!(catalog.max_optical_reach_km(),None);

        assert_eq!("10 1 1".parse::<TransponderCatalog>(),Err(TransponderParseError::FieldCount { entry: 0, found: 3 }));
        assert!(matches!("10 x 1 100".parse::<TransponderCatalog>(),Err(TransponderParseError::BadNumber { field: 1, .. })));
        assert!(matches!("10 1 1.5 100".parse::<TransponderCatalog>(),Err(TransponderParseError::BadNumber { field: 2, .. })));
        assert!(matches!("10 1 0 100".parse::<TransponderCatalog>(),Err(TransponderParseError::Invalid(RsaError::InvalidTransponder { .. }))));
    }
}
