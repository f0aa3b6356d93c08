//! Business logic services for Mill Mitra

pub mod auth;
pub mod backup;
pub mod daily_logs;
pub mod deliveries;
pub mod frk;
pub mod lifting;
pub mod release_orders;
pub mod reports;

pub use auth::AuthService;
pub use backup::BackupService;
pub use daily_logs::DailyLogService;
pub use deliveries::DeliveryService;
pub use frk::FrkService;
pub use lifting::LiftingService;
pub use release_orders::ReleaseOrderService;
pub use reports::ReportsService;
