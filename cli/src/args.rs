//! Command-line arguments.

use autoclick_core::{RateSetting, Settings};
use clap::Parser;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  autoclick                      # 500 CPS, toggle with 'c'
  autoclick --cps 10             # 10 clicks per second
  autoclick --key space          # toggle with the space bar
  autoclick --mouse right        # toggle with the right mouse button
  autoclick --cps 50 --key f     # 50 CPS, toggle with 'f'

Special keys:
  Use their name: space, tab, enter, shift, ctrl, alt, f1-f12, home, end, ...
  ESC always exits.

Mouse buttons:
  left, right, middle

Settings are also read from <config dir>/autoclick/config.yaml when present.";

#[derive(Parser, Debug)]
#[command(
    name = "autoclick",
    version,
    about = "A configurable tool to automate mouse clicks",
    after_help = EXAMPLES
)]
pub struct Args {
    /// Clicks per second (default: 500). Use 5-20 for most applications.
    #[arg(long, value_name = "CPS", allow_hyphen_values = true)]
    pub cps: Option<String>,

    /// Key to toggle clicking (default: 'c'). A character or a key name.
    #[arg(short, long)]
    pub key: Option<String>,

    /// Mouse button to toggle clicking (left, right, middle).
    #[arg(short, long)]
    pub mouse: Option<String>,

    /// Longest sleep of the click loop in milliseconds (1-10); bounds toggle latency.
    #[arg(long, value_name = "MS")]
    pub poll_ms: Option<u64>,

    /// Settings file (YAML, or JSON with a .json extension).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log clicks instead of performing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the effective settings as YAML and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Overlay command-line values on settings loaded from file.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(cps) = &self.cps {
            settings.rate = RateSetting::Text(cps.clone());
        }
        if let Some(key) = &self.key {
            settings.toggle_key = Some(key.clone());
        }
        if let Some(mouse) = &self.mouse {
            settings.toggle_button = Some(mouse.clone());
        }
        if let Some(poll_ms) = self.poll_ms {
            settings.poll_quantum_ms = poll_ms;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_settings_alone() {
        let args = Args::try_parse_from(["autoclick"]).unwrap();
        assert_eq!(args.apply(Settings::default()), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "autoclick", "--cps", "10", "--key", "space", "--mouse", "right", "--poll-ms", "5",
        ])
        .unwrap();
        let settings = args.apply(Settings::default());

        assert_eq!(settings.rate, RateSetting::Text("10".into()));
        assert_eq!(settings.toggle_key.as_deref(), Some("space"));
        assert_eq!(settings.toggle_button.as_deref(), Some("right"));
        assert_eq!(settings.poll_quantum_ms, 5);
    }

    #[test]
    fn test_negative_cps_is_accepted_as_text() {
        let args = Args::try_parse_from(["autoclick", "--cps", "-5"]).unwrap();
        assert_eq!(args.cps.as_deref(), Some("-5"));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let file = Settings {
            rate: RateSetting::Number(20.0),
            toggle_button: Some("middle".into()),
            ..Settings::default()
        };
        let args = Args::try_parse_from(["autoclick", "-m", "left"]).unwrap();
        let settings = args.apply(file);

        assert_eq!(settings.rate, RateSetting::Number(20.0));
        assert_eq!(settings.toggle_button.as_deref(), Some("left"));
    }
}
