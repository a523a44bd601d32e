// src/lib.rs
pub mod error;
pub mod query;

pub mod data {
    pub mod dataset;
}

pub mod workflow {
    pub mod channels;
    pub mod histogram;
    pub mod verification;
}
