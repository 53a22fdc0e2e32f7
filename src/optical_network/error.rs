use thiserror::Error;

use crate::dsa::bit_matrix::BitMatrixError;
use super::topology::{DemandId, DistanceKM, LinkId, NodeId};
use super::verifier::VerificationError;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum GridError {
    #[error(transparent)]
    Matrix(#[from] BitMatrixError),
    #[error("Core {core} requested, but the grid only has {core_count} core grids")]
    UnknownCore{core:usize,core_count:usize},
    #[error("Path references link {0}, which the grid does not cover")]
    UnknownLink(LinkId),
    #[error("Slots [{start},{start}+{width}) on link {link} are already occupied")]
    WindowOccupied{link:LinkId,start:usize,width:usize},
}

#[derive(Error,Debug,Clone,PartialEq)]
pub enum RsaError {
    #[error("This algorithm requires a topology with nodes and links")]
    EmptyTopology,
    #[error("This algorithm requires a non-empty demand set")]
    NoDemands,
    #[error("Number of frequency slots per core must be at least 1")]
    ZeroSlots,
    #[error("Number of cores per fiber must be at least 1")]
    ZeroCores,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No reference transponder catalog for {0} cores (known: 7, 12, 19)")]
    UnsupportedCoreCount(usize),
    #[error("Transponder type {id} is invalid: {reason}")]
    InvalidTransponder{id:usize,reason:&'static str},
    #[error("Demand {demand} is invalid: {reason}")]
    InvalidDemand{demand:DemandId,reason:&'static str},
    #[error("Link {link} has an invalid length of {length_km} km")]
    InvalidLink{link:LinkId,length_km:DistanceKM},
    #[error("Link {0} does not exist")]
    UnknownLink(LinkId),
    #[error("Node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("There are no possible routes for demand {demand}. The topology may be not connected enough, or the optical reach may be too small")]
    NoFeasiblePath{demand:DemandId},
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error("Exact formulation backend failed: {0}")]
    Backend(String),
}
