pub mod app;
pub mod events;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::TuiApp;
pub use events::EventHandler;
pub use theme::Theme;
