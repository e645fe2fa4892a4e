//! Command-line arguments for the map generation host.

use std::path::PathBuf;

use astral_mapgen::MapConfig;
use clap::Parser;

/// Astral map generator.
///
/// CLI values override settings loaded from `--config`.
#[derive(Parser, Debug)]
#[command(name = "astral", about = "Generate a hex terrain map")]
pub struct CliArgs {
    /// JSON map config; defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Regenerate synchronously instead of ticking once per frame.
    #[arg(long)]
    pub sync: bool,

    /// Write the default config to this path and exit.
    #[arg(long)]
    pub write_default_config: Option<PathBuf>,

    /// Number of times to invoke regenerate in sync mode.
    #[arg(long, default_value_t = 1)]
    pub regenerations: u32,

    /// Noise seed (-1 draws one per run).
    #[arg(long, allow_hyphen_values = true)]
    pub seed: Option<i32>,

    /// Seed of the placement random stream.
    #[arg(long)]
    pub random_seed: Option<u64>,

    /// Grid columns.
    #[arg(long)]
    pub width: Option<i32>,

    /// Grid rows.
    #[arg(long)]
    pub height: Option<i32>,
}

impl CliArgs {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_overrides(&self, config: &mut MapConfig) {
        if let Some(seed) = self.seed {
            config.noise.seed = seed;
        }
        if let Some(seed) = self.random_seed {
            config.random_seed = Some(seed);
        }
        if let Some(w) = self.width {
            config.width = w;
        }
        if let Some(h) = self.height {
            config.height = h;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let args = CliArgs::parse_from(["astral", "--width", "32", "--seed", "-1", "--random-seed", "9"]);
        let mut config = MapConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.width, 32);
        assert_eq!(config.height, 50);
        assert_eq!(config.noise.seed, -1);
        assert_eq!(config.random_seed, Some(9));
        assert!(!args.sync);
        assert_eq!(args.regenerations, 1);
    }

    #[test]
    fn test_cli_flags() {
        let args = CliArgs::parse_from(["astral", "--sync", "--regenerations", "3", "--config", "map.json"]);
        assert!(args.sync);
        assert_eq!(args.regenerations, 3);
        assert_eq!(args.config, Some(PathBuf::from("map.json")));
    }
}
