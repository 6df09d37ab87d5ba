pub mod guard;
pub mod hash;
