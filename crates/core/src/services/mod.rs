pub mod distribution_service;
pub mod leftover_service;
pub mod market_data_service;
pub mod projection_service;
pub mod recommender_service;
pub mod splitter_service;
