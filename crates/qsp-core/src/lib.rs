pub mod config_manager;
pub mod error;
pub mod locale;
pub mod report;
pub mod types;
pub mod view_state;

pub use config_manager::*;
pub use error::*;
pub use locale::Locale;
pub use report::{chart_points, render_plain_text, ChartPoint, StatusBadge, Tone};
pub use types::*;
pub use view_state::*;
