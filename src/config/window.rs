use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub gl_major: u8,
    pub gl_minor: u8,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Adv Game Engine Tutorial".to_string(),
            width: 1280,
            height: 720,
            gl_major: 3,
            gl_minor: 3,
            vsync: false,
        }
    }
}

impl WindowConfig {
    pub fn gl_version(&self) -> (u8, u8) {
        (self.gl_major, self.gl_minor)
    }
}
