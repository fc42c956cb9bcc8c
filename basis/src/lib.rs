pub mod basis;
pub mod cgto;
pub mod gto;
pub mod helper;
pub mod library;
