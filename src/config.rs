use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

/// Bus index used when the board config doesn't name one
pub const DEFAULT_I2C_BUS: u32 = 0;
/// Power level applied right after a successful bind
pub const DEFAULT_MAX_POWER: u32 = 1;
/// Usual SSD1306 address with SA0 tied low
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level bring-up configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub devno: Option<u32>,            // logical display to bind at boot
    pub board: Option<BoardConfig>,
}

/// Board wiring: which bus the panel hangs off and what sits on it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoardConfig {
    pub i2c_bus: Option<u32>,
    pub i2c_path: Option<String>,            // e.g. "/dev/i2c-{bus}"
    pub max_power: Option<u32>,
    pub devices: Option<Vec<DisplayConfig>>, // indexed by devno
}

/// One SSD1306 panel on the board bus.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub address: Option<u8>,        // 7-bit I2C address
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub contrast: Option<u8>,       // 0-255
}

impl BoardConfig {
    pub fn bus_index(&self) -> u32 {
        self.i2c_bus.unwrap_or(DEFAULT_I2C_BUS)
    }

    pub fn max_power(&self) -> u32 {
        self.max_power.unwrap_or(DEFAULT_MAX_POWER)
    }

    /// Configured devices, or a single default SSD1306 at 0x3C
    pub fn devices(&self) -> Vec<DisplayConfig> {
        match self.devices.as_ref() {
            Some(d) if !d.is_empty() => d.clone(),
            _ => vec![DisplayConfig::default()],
        }
    }
}

impl DisplayConfig {
    pub fn address(&self) -> u8 {
        self.address.unwrap_or(DEFAULT_I2C_ADDRESS)
    }
}

impl Config {
    /// Board section, defaulted when absent
    pub fn board(&self) -> BoardConfig {
        self.board.clone().unwrap_or_default()
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "lymons-bringup", about = "LyMonS OLED bring-up", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// I2C bus index the panel is wired to
    #[arg(long)]
    pub i2c_bus: Option<u32>,
    /// Device node template, `{bus}` is replaced by the index
    #[arg(long)]
    pub i2c_path: Option<String>,
    /// Power level applied after bind
    #[arg(long)]
    pub max_power: Option<u32>,
    /// Logical display number to bind
    #[arg(long)]
    pub devno: Option<u32>,
    /// keep the display powered this many seconds before teardown
    #[arg(long, default_value_t = 0)]
    pub hold_secs: u64,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/lymons/bringup.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/lymons/bringup.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["lymons-bringup.yaml", "config/lymons-bringup.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.devno.is_some()          { dst.devno = src.devno; }
    match (&mut dst.board, src.board) {
        (None, Some(b)) => dst.board = Some(b),
        (Some(d), Some(s)) => merge_board(d, s),
        _ => {}
    }
}

fn merge_board(dst: &mut BoardConfig, src: BoardConfig) {
    if src.i2c_bus.is_some()     { dst.i2c_bus = src.i2c_bus; }
    if src.i2c_path.is_some()    { dst.i2c_path = src.i2c_path; }
    if src.max_power.is_some()   { dst.max_power = src.max_power; }
    if src.devices.is_some()     { dst.devices = src.devices; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.devno.is_some()           { cfg.devno = cli.devno; }
    let any_board = cli.i2c_bus.is_some()
        || cli.i2c_path.is_some()
        || cli.max_power.is_some();

    if any_board && cfg.board.is_none() {
        cfg.board = Some(BoardConfig::default());
    }
    if let Some(board) = cfg.board.as_mut() {
        if cli.i2c_bus.is_some()     { board.i2c_bus = cli.i2c_bus; }
        if cli.i2c_path.is_some()    { board.i2c_path = cli.i2c_path.clone(); }
        if cli.max_power.is_some()   { board.max_power = cli.max_power; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let Some(board) = cfg.board.as_ref() else {
        return Ok(());
    };
    if board.max_power() == 0 {
        return Err(ConfigError::Validation("board max_power must be >= 1".into()));
    }
    if let Some(path) = board.i2c_path.as_ref() {
        if path.is_empty() {
            return Err(ConfigError::Validation("board i2c_path must not be empty".into()));
        }
    }
    if matches!(board.devices.as_ref(), Some(d) if d.is_empty()) {
        return Err(ConfigError::Validation("board devices must list at least one display".into()));
    }
    for (devno, display) in board.devices().iter().enumerate() {
        if display.address() > 0x7F {
            return Err(ConfigError::Validation(format!(
                "display {devno}: address 0x{:02X} is not a 7-bit I2C address",
                display.address()
            )));
        }
        let size = (display.width.unwrap_or(128), display.height.unwrap_or(64));
        match size {
            (128, 64) | (128, 32) => {},
            (w, h) => return Err(ConfigError::Validation(format!(
                "display {devno}: unsupported SSD1306 size {w}x{h}"
            ))),
        }
        if let Some(rot) = display.rotate_deg {
            match rot {
                0 | 90 | 180 | 270 => {},
                _ => return Err(ConfigError::Validation(format!(
                    "display {devno}: rotate_deg must be 0|90|180|270"
                ))),
            }
        }
    }
    Ok(())
}
