use serde::{Deserialize, Serialize};

use super::error::RsaError;

// propagation speed in fiber, 200000 km/s
pub const PROPAGATION_SPEED_KM_PER_MS:f64 = 200.0;

#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoadmType {
    // any core at any hop, one shared spectrum grid of cores*slots per link
    #[default]
    FullyNonBlocking,
    // a lightpath keeps its core end to end, one grid per core
    CoreContinuityConstraint,
}

impl RoadmType {
    pub fn enforces_core_continuity(self) -> bool {
        matches!(self,RoadmType::CoreContinuityConstraint)
    }
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct RscaConfig {
    pub max_paths_per_pair:usize,
    pub num_cores:usize,
    pub num_slots_per_core:usize,
    // non-positive means no limit
    pub max_propagation_delay_ms:f64,
    pub roadm:RoadmType,
    pub total_offered_traffic_tbps:f64,
    pub scale_traffic:bool,
    pub max_rounds:Option<usize>,
}

impl Default for RscaConfig {
    fn default() -> Self {
        Self {
            max_paths_per_pair:5,
            num_cores:7,
            num_slots_per_core:120,
            max_propagation_delay_ms:-1.0,
            roadm:RoadmType::default(),
            total_offered_traffic_tbps:200.0,
            scale_traffic:false,
            max_rounds:None,
        }
    }
}

impl RscaConfig {
    pub fn validate(&self) -> Result<(),RsaError> {
        if self.max_paths_per_pair == 0 {
            return Err(RsaError::InvalidConfig("max_paths_per_pair must be at least 1".into()))
        }
        if self.num_cores == 0 {return Err(RsaError::ZeroCores)}
        if self.num_slots_per_core == 0 {return Err(RsaError::ZeroSlots)}
        if self.max_propagation_delay_ms.is_nan() {
            return Err(RsaError::InvalidConfig("max_propagation_delay_ms is not a number".into()))
        }
        if self.scale_traffic && !(self.total_offered_traffic_tbps.is_finite() && self.total_offered_traffic_tbps >= 0.0) {
            return Err(RsaError::InvalidConfig(format!(
                "total_offered_traffic_tbps must be a non-negative number, got {}",self.total_offered_traffic_tbps
            )))
        }
        Ok(())
    }
    pub fn core_continuity(&self) -> bool {
        self.roadm.enforces_core_continuity()
    }
    // traffic matrices are kept in Gbps
    pub fn total_offered_traffic_gbps(&self) -> f64 {
        self.total_offered_traffic_tbps*1000.0
    }
    // None when unlimited
    pub fn max_path_length_km(&self) -> Option<f64> {
        if self.max_propagation_delay_ms <= 0.0 {return None}
        Some(self.max_propagation_delay_ms*PROPAGATION_SPEED_KM_PER_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::{RoadmType, RscaConfig};
    use crate::optical_network::error::RsaError;

    #[test]
    fn test_defaults() {
        let config = RscaConfig::default();
        config.validate().unwrap();
        assert!(!config.core_continuity());
        assert!(!config.scale_traffic);
        assert_eq!(config.max_path_length_km(),None);
        assert_eq!(config.total_offered_traffic_gbps(),200_000.0);
    }
    #[test]
    fn test_bind_from_json() {
        let config:RscaConfig = serde_json::from_str(r#"{
            "num_cores": 19,
            "roadm": "core-continuity-constraint",
            "max_propagation_delay_ms": 5.0
        }"#).unwrap();
        assert_eq!(config.num_cores,19);
        assert_eq!(config.roadm,RoadmType::CoreContinuityConstraint);
        assert_eq!(config.max_paths_per_pair,5);
        assert_eq!(config.max_path_length_km(),Some(1000.0));
        assert!(serde_json::from_str::<RscaConfig>(r#"{"roadm":"blocking"}"#).is_err());
    }
    #[test]
    fn test_validate() {
        let bad = RscaConfig {num_cores:0,..RscaConfig::default()};
        assert_eq!(bad.validate(),Err(RsaError::ZeroCores));
        let bad = RscaConfig {num_slots_per_core:0,..RscaConfig::default()};
        assert_eq!(bad.validate(),Err(RsaError::ZeroSlots));
        let bad = RscaConfig {max_paths_per_pair:0,..RscaConfig::default()};
        assert!(matches!(bad.validate(),Err(RsaError::InvalidConfig(_))));
        let bad = RscaConfig {scale_traffic:true,total_offered_traffic_tbps:f64::NAN,..RscaConfig::default()};
        assert!(bad.validate().is_err());
    }
}
