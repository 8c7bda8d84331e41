use crate::state::BlockPos;
use serde::{Deserialize, Serialize};

/// A block the host is about to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    /// Material key, optionally namespaced (`minecraft:white_banner`)
    pub type_key: String,
    pub position: BlockPos,
    /// Decorative banner patterns; always 0 for non-banners
    #[serde(default)]
    pub pattern_count: usize,
}

impl PlacedBlock {
    pub fn new(type_key: impl Into<String>, position: BlockPos) -> Self {
        Self {
            type_key: type_key.into(),
            position,
            pattern_count: 0,
        }
    }

    pub fn with_patterns(mut self, pattern_count: usize) -> Self {
        self.pattern_count = pattern_count;
        self
    }

    /// Key without its namespace.
    pub fn key(&self) -> &str {
        match self.type_key.rsplit_once(':') {
            Some((_, key)) => key,
            None => &self.type_key,
        }
    }

    pub fn category(&self) -> BlockCategory {
        let key = self.key();
        if key.ends_with("banner") && !key.contains("wall") {
            BlockCategory::Banner(banner_colour(key, self.pattern_count))
        } else if key == "chest" {
            BlockCategory::Chest
        } else {
            BlockCategory::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BannerColour {
    /// Plain white: no patterns at all
    White,
    Colored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCategory {
    /// Standing banner (wall banners are excluded)
    Banner(BannerColour),
    Chest,
    Other,
}

/// A banner only counts as white when it is undecorated.
pub fn banner_colour(key: &str, pattern_count: usize) -> BannerColour {
    if key.contains("white") && pattern_count == 0 {
        BannerColour::White
    } else {
        BannerColour::Colored
    }
}
