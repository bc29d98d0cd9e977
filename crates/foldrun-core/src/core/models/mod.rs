pub mod features;
pub mod prediction;
pub mod structure;
