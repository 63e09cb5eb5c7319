//! # Compute Module
//!
//! Execution backends and scan primitives shared by every pipeline stage.
//!
//! Every stage is written once against [`backend::Backend`]; [`backend::Serial`] runs
//! kernels on the calling thread and, with the `parallel` feature, `backend::Rayon`
//! spreads them over the rayon pool. [`scan`] provides the inclusive prefix product
//! over any [`scan::Monoid`], evaluated either as a left fold or as a blocked parallel
//! scan with logarithmic depth.

pub mod backend;
pub mod scan;
