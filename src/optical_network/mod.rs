// routing, spectrum and core assignment over a multi-core fiber
// elastic optical network, carrying a static traffic matrix with
// flex-grid transponders

/* spectrum is kept per link in row major order
suppose a total of L links, each link has slots 0-S on every core
then each row is 1 by S representing a link
total L rows representing all links
one L by S matrix per core when lightpaths keep their core end to end,
otherwise a single L by S*C matrix shared by every core */

/* rules, suppose a lightpath takes 3 slots starting at 5 and goes through link A->B->C->D
then A[5..8] B[5..8] C[5..8] D[5..8] must be all free, on the same core if cores are continuous
the same slot numbers must be used on every link of the path, spectrum continuity
the slots of one lightpath must be adjacent, spectrum contiguity
slots at or beyond a link's capacity count as occupied from the start */

pub mod catalog;
pub mod config;
pub mod error;
pub mod grid;
pub mod lightpath;
pub mod scheduler;
pub mod solver;
pub mod summary;
pub mod topology;
pub mod transponder;
pub mod verifier;

pub use config::{RoadmType, RscaConfig};
pub use error::{GridError, RsaError};
pub use lightpath::Lightpath;
pub use solver::{ExactFormulation, GreedyHeuristic, IlpAssignment, IlpBackend, IlpInstance, Problem, RscaSolver, Solution};
pub use summary::{RunStatus, RunSummary};
pub use topology::{CandidatePathSource, Demand, Network, PathTable};
pub use transponder::{TransponderCatalog, TransponderType};
pub use verifier::{VerificationError, verify};
