use crate::loader::LoaderSettings;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Wildfire recovery map with mutually exclusive analysis overlays", long_about = None)]
pub struct Config {
    /// Base URL of the analysis API
    #[arg(long, env = "FIRELENS_API_BASE", default_value = "http://localhost:8001")]
    pub api_base: String,

    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    #[arg(long, default_value_t = 0.7)]
    pub overlay_opacity: f32,

    /// Edge length of the rendered overlay tiles, in pixels
    #[arg(long, default_value_t = 256)]
    pub tile_size: u32,

    /// Pause between overlay teardown and the next load, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub settle_ms: u64,

    /// Raster requests slower than this fall back to markers
    #[arg(long, default_value_t = 30)]
    pub load_timeout_secs: u64,

    /// Number of rendered tiles kept in memory
    #[arg(long, default_value_t = 4096)]
    pub tile_cache_entries: u64,

    /// Fire selected at startup
    #[arg(long, default_value = "camp-fire-2018")]
    pub fire_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: "http://localhost:8001".to_string(),
            port: 8000,
            overlay_opacity: 0.7,
            tile_size: 256,
            settle_ms: 0,
            load_timeout_secs: 30,
            tile_cache_entries: 4096,
            fire_id: "camp-fire-2018".to_string(),
        }
    }
}

impl Config {
    /// Joins the API base and `path`.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn loader_settings(&self) -> LoaderSettings {
        LoaderSettings {
            tile_size: self.tile_size,
            opacity: self.overlay_opacity.clamp(0.0, 1.0),
            timeout: self.load_timeout(),
        }
    }
}
