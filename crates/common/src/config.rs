use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a field configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config format: {0:?} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),
    #[error("tile_width must be a non-zero power of two, got {0}")]
    InvalidTileWidth(usize),
    #[error("composite_factor must be odd and at least 1, got {0}")]
    InvalidCompositeFactor(usize),
    #[error("birth_probability_denominator must be a power of two of at least 2, got {0}")]
    InvalidBirthDenominator(u32),
}

/// Which neighbor rule a tile steps with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Birth on 3, random birth on 2, death below 2, everything else unchanged.
    #[default]
    Stochastic,
    /// Strict B3/S23.
    Conway,
}

/// Generation parameters for a field of tiles.
///
/// The defaults reproduce the classic asteroid look: 32x32 tiles, a 3x3
/// composite, 50 seeded cells per sub-block and a 1-in-32 random birth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Side length of one tile in cells.
    pub tile_width: usize,
    /// Tiles per side of the composite; the target tile is the middle one.
    pub composite_factor: usize,
    /// Live cells scattered into each sub-block at construction.
    pub live_cells_per_sub_block: usize,
    /// A cell with two neighbors is born with probability `1 / denominator`.
    pub birth_probability_denominator: u32,
    pub rule: RuleKind,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            tile_width: 32,
            composite_factor: 3,
            live_cells_per_sub_block: 50,
            birth_probability_denominator: 32,
            rule: RuleKind::Stochastic,
        }
    }
}

impl FieldConfig {
    /// Load a config from a `.json`, `.yaml` or `.yml` file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let text = std::fs::read_to_string(path)?;
        let config: FieldConfig = match ext.as_str() {
            "json" => serde_json::from_str(&text)?,
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the constraints the kernel relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tile_width.is_power_of_two() {
            return Err(ConfigError::InvalidTileWidth(self.tile_width));
        }
        if self.composite_factor == 0 || self.composite_factor % 2 == 0 {
            return Err(ConfigError::InvalidCompositeFactor(self.composite_factor));
        }
        let denom = self.birth_probability_denominator;
        if denom < 2 || !denom.is_power_of_two() {
            return Err(ConfigError::InvalidBirthDenominator(denom));
        }
        Ok(())
    }

    /// Side length of the composite grid in cells.
    pub fn composite_width(&self) -> usize {
        self.tile_width * self.composite_factor
    }

    /// How many tiles the composite reaches out from the target in each direction.
    pub fn radius(&self) -> i64 {
        (self.composite_factor / 2) as i64
    }

    /// Number of sub-blocks (and random streams) in the composite.
    pub fn sub_block_count(&self) -> usize {
        self.composite_factor * self.composite_factor
    }

    /// Mask applied to scatter draws to land inside one tile.
    pub fn scatter_mask(&self) -> u32 {
        (self.tile_width - 1) as u32
    }

    /// Mask applied to birth draws.
    pub fn birth_mask(&self) -> u32 {
        self.birth_probability_denominator - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_classic_field() {
        let c = FieldConfig::default();
        assert_eq!(c.composite_width(), 96);
        assert_eq!(c.radius(), 1);
        assert_eq!(c.sub_block_count(), 9);
        assert_eq!(c.scatter_mask(), 31);
        assert_eq!(c.birth_mask(), 31);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_width() {
        let c = FieldConfig {
            tile_width: 30,
            ..FieldConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidTileWidth(30))));
    }

    #[test]
    fn rejects_even_composite_factor() {
        let c = FieldConfig {
            composite_factor: 2,
            ..FieldConfig::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidCompositeFactor(2))
        ));
    }

    #[test]
    fn rejects_degenerate_birth_denominator() {
        for denom in [0, 1, 24] {
            let c = FieldConfig {
                birth_probability_denominator: denom,
                ..FieldConfig::default()
            };
            assert!(c.validate().is_err(), "denominator {denom} accepted");
        }
    }

    #[test]
    fn single_tile_composite_is_valid() {
        let c = FieldConfig {
            composite_factor: 1,
            ..FieldConfig::default()
        };
        assert!(c.validate().is_ok());
        assert_eq!(c.radius(), 0);
    }

    #[test]
    fn loads_partial_json_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, r#"{{ "live_cells_per_sub_block": 0, "rule": "conway" }}"#).unwrap();

        let c = FieldConfig::from_path(&path).unwrap();
        assert_eq!(c.live_cells_per_sub_block, 0);
        assert_eq!(c.rule, RuleKind::Conway);
        assert_eq!(c.tile_width, 32);
    }

    #[test]
    fn loads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.yaml");
        std::fs::write(&path, "tile_width: 16\ncomposite_factor: 5\n").unwrap();

        let c = FieldConfig::from_path(&path).unwrap();
        assert_eq!(c.composite_width(), 80);
    }

    #[test]
    fn invalid_file_contents_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.yml");
        std::fs::write(&path, "tile_width: 12\n").unwrap();

        assert!(matches!(
            FieldConfig::from_path(&path),
            Err(ConfigError::InvalidTileWidth(12))
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.toml");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(
            FieldConfig::from_path(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
