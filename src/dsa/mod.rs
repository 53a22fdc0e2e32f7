pub mod bit_matrix;
pub(crate) mod bitset;
