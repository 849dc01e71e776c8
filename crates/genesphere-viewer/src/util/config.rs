use anyhow::Context;
use directories::ProjectDirs;
use genesphere_core::{EngineParams, LayoutMode, Palette};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const DEFAULT_DEMO_NODES: usize = 200;
pub const DEMO_NODES_RANGE: RangeInclusive<usize> = 10..=2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub layout_mode: LayoutMode,
    /// Loaded at startup instead of the demo network when set.
    pub dataset_path: Option<PathBuf>,
    pub demo_nodes: usize,
    pub demo_seed: u64,
    pub palette: Palette,
    pub engine: EngineParams,
}

impl ViewerConfig {
    /// Demo size clamped to what the panel slider offers.
    pub fn demo_node_count(&self) -> usize {
        self.demo_nodes.clamp(*DEMO_NODES_RANGE.start(), *DEMO_NODES_RANGE.end())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::Uniform,
            dataset_path: None,
            demo_nodes: DEFAULT_DEMO_NODES,
            demo_seed: 42,
            palette: Palette::default(),
            engine: EngineParams::default(),
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "genesphere")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    match toml::from_str::<ViewerConfig>(&contents) {
        Ok(mut cfg) => {
            cfg.demo_nodes = cfg.demo_node_count();
            cfg
        }
        Err(err) => {
            bevy::log::warn!(path = %path.display(), %err, "ignoring unreadable viewer config");
            ViewerConfig::default()
        }
    }
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<PathBuf> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)?;
    Ok(path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesphere_core::Srgb;
    use tempfile::tempdir;

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("viewer.toml");
        let cfg = ViewerConfig {
            layout_mode: LayoutMode::Core,
            dataset_path: Some(PathBuf::from("/data/net.tsv")),
            palette: Palette {
                hover_color: Srgb::new(1, 2, 3),
                ..Palette::default()
            },
            ..ViewerConfig::default()
        };

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(
            &path,
            r##"
layout_mode = "core"

[palette]
top_node_color = "#112233"

[engine]
radius_core = 12.0
"##,
        )
        .expect("write");

        let cfg = load_or_default_from_path(&path);
        assert_eq!(cfg.layout_mode, LayoutMode::Core);
        assert_eq!(cfg.palette.top_node_color, Srgb::new(0x11, 0x22, 0x33));
        assert_eq!(cfg.palette.line_color, Palette::default().line_color);
        assert_eq!(cfg.engine.radius_core, 12.0);
        assert_eq!(cfg.engine.radius_outer, EngineParams::default().radius_outer);
        assert_eq!(cfg.demo_nodes, DEFAULT_DEMO_NODES);
    }

    #[test]
    fn bad_color_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "[palette]\nhover_color = \"red\"\n").expect("write");

        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());
    }

    #[test]
    fn demo_size_is_clamped_on_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "demo_nodes = 0\n").expect("write");
        assert_eq!(load_or_default_from_path(&path).demo_nodes, 10);

        fs::write(&path, "demo_nodes = 999999\n").expect("write");
        assert_eq!(load_or_default_from_path(&path).demo_nodes, 2000);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().expect("tempdir");
        let cfg = load_or_default_from_path(&dir.path().join("absent.toml"));
        assert_eq!(cfg, ViewerConfig::default());
    }
}
