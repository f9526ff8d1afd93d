use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entity::{DEFAULT_APPEARANCE, Entity, EntityKind, Patrol, Rect};

/// Errors raised while loading or validating a level definition.
#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Parse(String),
    UnsupportedFormat(String),
    /// A level needs at least one platform to respawn on.
    Empty,
    InvalidGeometry(String),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "level io error: {e}"),
            Self::Parse(e) => write!(f, "level parse error: {e}"),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported level format: {ext}"),
            Self::Empty => write!(f, "level has no platforms"),
            Self::InvalidGeometry(what) => write!(f, "invalid level geometry: {what}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

fn default_appearance() -> String {
    DEFAULT_APPEARANCE.to_string()
}

/// A rectangle as written in a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectDef {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_appearance")]
    pub appearance: String,
}

impl RectDef {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            appearance: default_appearance(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn entity(&self, kind: EntityKind) -> Entity {
        Entity::new(kind, self.rect()).with_appearance(self.appearance.clone())
    }
}

/// A monster as written in a level file. Zero speed or range means stationary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterDef {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default = "default_appearance")]
    pub appearance: String,
    #[serde(default)]
    pub patrol_speed: f32,
    #[serde(default)]
    pub patrol_range: f32,
}

impl MonsterDef {
    pub fn stationary(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            appearance: default_appearance(),
            patrol_speed: 0.0,
            patrol_range: 0.0,
        }
    }

    fn entity(&self) -> Entity {
        let entity = Entity::new(
            EntityKind::Monster,
            Rect::new(self.x, self.y, self.width, self.height),
        )
        .with_appearance(self.appearance.clone());
        if self.patrol_speed != 0.0 && self.patrol_range > 0.0 {
            entity.with_patrol(Patrol {
                origin_x: self.x,
                range: self.patrol_range,
                speed: self.patrol_speed,
            })
        } else {
            entity
        }
    }
}

/// Static description of a level. Never mutated by the simulation; every run
/// gets its own [`World`] via [`LevelDef::instantiate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub platforms: Vec<RectDef>,
    #[serde(default)]
    pub monsters: Vec<MonsterDef>,
    #[serde(default)]
    pub coins: Vec<RectDef>,
    #[serde(default)]
    pub meats: Vec<RectDef>,
    #[serde(default)]
    pub wings: Vec<RectDef>,
    pub finish_line: RectDef,
}

/// Mutable per-run entity collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub platforms: Vec<Entity>,
    pub monsters: Vec<Entity>,
    pub collectibles: Vec<Entity>,
    pub finish_line: Entity,
}

impl World {
    pub fn remaining(&self, kind: EntityKind) -> usize {
        self.collectibles
            .iter()
            .filter(|c| c.kind == kind && !c.consumed)
            .count()
    }
}

impl LevelDef {
    /// The first stage: nine platforms, two monsters, three coins, a meat, a
    /// wing, and a finish line resting on the last platform.
    pub fn stage_one() -> Self {
        let platforms = [
            (0.0, 300.0, 400.0),
            (450.0, 200.0, 100.0),
            (600.0, 150.0, 150.0),
            (800.0, 150.0, 150.0),
            (1000.0, 150.0, 150.0),
            (1200.0, 250.0, 200.0),
            (1500.0, 250.0, 200.0),
            (1700.0, 300.0, 200.0),
            (1950.0, 250.0, 200.0),
        ]
        .into_iter()
        .map(|(x, y, w)| RectDef::new(x, y, w, 20.0))
        .collect();

        let mut second_monster = MonsterDef::stationary(1000.0, 100.0, 30.0, 30.0);
        second_monster.appearance = "monster2".to_string();

        Self {
            name: "stage-1".to_string(),
            platforms,
            monsters: vec![
                MonsterDef::stationary(700.0, 120.0, 30.0, 30.0),
                second_monster,
            ],
            coins: vec![
                RectDef::new(300.0, 220.0, 30.0, 30.0),
                RectDef::new(500.0, 170.0, 30.0, 30.0),
                RectDef::new(600.0, 170.0, 30.0, 30.0),
            ],
            meats: vec![RectDef::new(1250.0, 220.0, 30.0, 30.0)],
            wings: vec![RectDef::new(850.0, 120.0, 30.0, 30.0)],
            finish_line: RectDef::new(2100.0, 150.0, 40.0, 100.0),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LevelError> {
        let level: LevelDef =
            toml::from_str(content).map_err(|e| LevelError::Parse(e.to_string()))?;
        level.validate()?;
        Ok(level)
    }

    pub fn from_json_str(content: &str) -> Result<Self, LevelError> {
        let level: LevelDef =
            serde_json::from_str(content).map_err(|e| LevelError::Parse(e.to_string()))?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if self.platforms.is_empty() {
            return Err(LevelError::Empty);
        }
        let rects = self
            .platforms
            .iter()
            .chain(&self.coins)
            .chain(&self.meats)
            .chain(&self.wings)
            .chain(std::iter::once(&self.finish_line))
            .map(|r| (r.width, r.height))
            .chain(self.monsters.iter().map(|m| (m.width, m.height)));
        for (w, h) in rects {
            if !(w > 0.0 && h > 0.0) {
                return Err(LevelError::InvalidGeometry(format!(
                    "{}: non-positive size {w}x{h}",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Build fresh, independently owned entity collections for a run.
    pub fn instantiate(&self) -> World {
        let collectibles = self
            .meats
            .iter()
            .map(|r| r.entity(EntityKind::Meat))
            .chain(self.wings.iter().map(|r| r.entity(EntityKind::Wing)))
            .chain(self.coins.iter().map(|r| r.entity(EntityKind::Coin)))
            .collect();

        World {
            platforms: self
                .platforms
                .iter()
                .map(|r| r.entity(EntityKind::Platform))
                .collect(),
            monsters: self.monsters.iter().map(MonsterDef::entity).collect(),
            collectibles,
            finish_line: self.finish_line.entity(EntityKind::FinishLine),
        }
    }
}

/// Supplies the static level a run is built from.
pub trait LevelProvider: Send + Sync {
    fn load(&self) -> Result<LevelDef, LevelError>;
}

/// The compiled-in first stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLevel;

impl LevelProvider for BuiltinLevel {
    fn load(&self) -> Result<LevelDef, LevelError> {
        Ok(LevelDef::stage_one())
    }
}

/// A level read from a `.toml` or `.json` file.
#[derive(Debug, Clone)]
pub struct FileLevel {
    pub path: PathBuf,
}

impl FileLevel {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl LevelProvider for FileLevel {
    fn load(&self) -> Result<LevelDef, LevelError> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(&self.path)?;
        let level = match ext.as_str() {
            "toml" => LevelDef::from_toml_str(&content)?,
            "json" => LevelDef::from_json_str(&content)?,
            other => return Err(LevelError::UnsupportedFormat(other.to_string())),
        };
        tracing::info!(
            path = %self.path.display(),
            level = %level.name,
            platforms = level.platforms.len(),
            "Loaded level"
        );
        Ok(level)
    }
}
