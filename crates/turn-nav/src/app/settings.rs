use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Read an environment variable and parse it, `None` if unset or unparsable
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Turn Nav - replay and drive turn-by-turn navigation from the command line
pub struct Settings {
    #[clap(subcommand)]
    pub command: Command,

    /// Key-value cache file (defaults to a per-user config path)
    #[clap(long, global = true, value_name = "FILE", env = "TURN_NAV_CACHE")]
    pub cache_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Decode an encoded curve and print its coordinates as JSON
    Decode {
        /// The encoded curve
        curve: String,
    },
    /// Replay recorded fixes, using each fix's timestamp as the clock
    Replay(RunArgs),
    /// Feed recorded fixes in real time, with the ETA cadence ticking on the wall clock
    Drive(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directions response JSON, primary route first
    #[clap(long, value_name = "FILE", conflicts_with = "gpx")]
    pub routes: Option<PathBuf>,

    /// GPX track to navigate instead of a directions response
    #[clap(long, value_name = "FILE")]
    pub gpx: Option<PathBuf>,

    /// Cruise speed used to time GPX routes, in m/s
    #[clap(long, default_value = "13.9")]
    pub cruise_speed: f64,

    /// JSON array of location fixes
    #[clap(long, value_name = "FILE")]
    pub fixes: PathBuf,

    /// Speak announcements (remembered for later runs)
    #[clap(long, overrides_with = "no_voice")]
    pub voice: bool,

    /// Keep quiet (remembered for later runs)
    #[clap(long, overrides_with = "voice")]
    pub no_voice: bool,

    /// Route index to navigate instead of the primary
    #[clap(long, allow_negative_numbers = true)]
    pub select: Option<i64>,

    /// Cadence tick period in milliseconds (drive only)
    #[clap(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Play fixes this many times faster than recorded (drive only)
    #[clap(long, default_value = "1.0")]
    pub speedup: f64,
}

impl Settings {
    /// Parse the process arguments, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }
}

impl RunArgs {
    /// Voice choice from the flags, then `TURN_NAV_VOICE`; `None` if neither says
    pub fn voice_override(&self) -> Option<bool> {
        if self.voice {
            Some(true)
        } else if self.no_voice {
            Some(false)
        } else {
            get_env("TURN_NAV_VOICE")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_command() {
        let settings = Settings::try_parse_from(["turn-nav", "decode", "_p~iF~ps|U"]).unwrap();
        assert!(matches!(settings.command, Command::Decode { ref curve } if curve == "_p~iF~ps|U"));
    }

    #[test]
    fn test_replay_flags() {
        let settings = Settings::try_parse_from([
            "turn-nav",
            "replay",
            "--routes",
            "routes.json",
            "--fixes",
            "fixes.json",
            "--select",
            "-1",
            "--no-voice",
            "--cache-file",
            "cache.json",
        ])
        .unwrap();
        let Command::Replay(args) = settings.command else {
            panic!("expected replay");
        };
        assert_eq!(args.routes, Some(PathBuf::from("routes.json")));
        assert_eq!(args.select, Some(-1));
        assert_eq!(args.voice_override(), Some(false));
        assert_eq!(args.tick_ms, 1000);
        assert_eq!(settings.cache_file, Some(PathBuf::from("cache.json")));
    }

    #[test]
    fn test_last_voice_flag_wins() {
        let settings = Settings::try_parse_from([
            "turn-nav", "drive", "--fixes", "f.json", "--no-voice", "--voice",
        ])
        .unwrap();
        let Command::Drive(args) = settings.command else {
            panic!("expected drive");
        };
        assert_eq!(args.voice_override(), Some(true));
    }

    #[test]
    fn test_routes_and_gpx_conflict() {
        assert!(
            Settings::try_parse_from([
                "turn-nav", "replay", "--routes", "a.json", "--gpx", "b.gpx", "--fixes", "f.json",
            ])
            .is_err()
        );
    }
}
