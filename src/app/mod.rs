pub mod dashboard_use_case;
pub mod ports;

pub use dashboard_use_case::DashboardUseCase;
pub use ports::SheetSourcePort;
