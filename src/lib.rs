pub mod candidate;
pub mod config;
pub mod error;
pub mod filter;
pub mod generator;
pub mod letters;
pub mod model;
pub mod phonotactics;
pub mod scorer;
pub mod selector;
pub mod solver;
pub mod template;
pub mod verifier;
