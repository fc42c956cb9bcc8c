//! Pauli operators and fermion-to-qubit mappings

mod converter;
mod mapper;
mod pauli;

pub use converter::QubitConverter;
pub use mapper::{create_mapper, JordanWignerMapper, MapperKind, ParityMapper, QubitMapper};
pub use pauli::{PauliString, SparsePauliOp};
