//! Types shared by the API and DB representations.

pub mod generator;
pub mod hint;
pub mod slot;
