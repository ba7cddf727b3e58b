// Presentation: chart configuration, view model, HTML page

pub mod chart;
pub mod page;
pub mod view;

pub use page::DashboardTemplate;
pub use view::DashboardView;
