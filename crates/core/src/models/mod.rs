pub mod asset_class;
pub mod candidate;
pub mod holding;
pub mod money;
pub mod plan;
pub mod projection;
pub mod quote;
pub mod recommendation;
pub mod report;
pub mod settings;
