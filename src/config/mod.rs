pub mod core;
pub mod rendering;
pub mod window;

pub use self::core::{AppConfig, LoggingConfig};
pub use rendering::RenderConfig;
pub use window::WindowConfig;
