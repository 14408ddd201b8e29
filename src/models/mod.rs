//! Data models for oracle requests and witnessing agreements

pub mod request;
pub mod sla;

pub use request::{DataRequest, Filter, FilterOp, Reducer, RequestHash, Stage, COLLATERAL_FLOOR};
pub use sla::{BaseFeeSelector, FeeMargin, FeeQuote, Sla};
