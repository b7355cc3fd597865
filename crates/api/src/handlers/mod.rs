pub mod agents;
pub mod call_sessions;
pub mod campaigns;
pub mod metrics;
pub mod scripts;
