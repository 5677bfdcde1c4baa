//! Built-in gate stages.

pub mod count;
pub mod quota;

pub use count::DocumentCountStage;
pub use quota::QuotaStage;
