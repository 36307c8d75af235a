//! Business logic services

pub mod contest_service;
pub mod monitor_service;
pub mod notify_service;
pub mod scoring;
pub mod standings_service;
pub mod sweep_service;

pub use contest_service::ContestService;
pub use monitor_service::SubmissionMonitor;
pub use notify_service::NotifyService;
pub use standings_service::{ContestLocks, StandingsService, SubmissionOutcome};
