//! Command-line interface definitions
//!
//! Uses clap for argument parsing with derive macros. The device parameters
//! travel in a single `key=value|key=value` argument, split by
//! [`crate::invocation::InvocationArgs`].

use clap::Parser;
use std::path::PathBuf;

/// Audio Switcher - toggle the default playback device between headphones and speakers
#[derive(Parser, Debug)]
#[command(name = "audio-switcher")]
#[command(version)]
#[command(
    about = "Audio Switcher - Toggle the default PipeWire playback device between headphones and speakers"
)]
#[command(after_help = "\
PARAMETERS:
  A single argument of key=value pairs joined by '|':
    switch=1          Toggle once and exit (no indicator)
    headphones=NAME   Display name of the headphones device
    speakers=NAME     Display name of the speakers device

  Names are matched ignoring case and whitespace when toggling.

EXAMPLES:
  audio-switcher 'switch=1|headphones=Headphones|speakers=Speakers (Realtek)'
  audio-switcher 'headphones=Headphones|speakers=Speakers (Realtek)'
  audio-switcher --list-devices

INTERACTIVE MODE:
  Without switch=, the switcher keeps running and shows a notification
  whenever the default device changes.
    kill -USR1 <pid>   Toggle devices
    kill -TERM <pid>   Shut down

PIPEWIRE INTEGRATION:
  Uses pw-dump for JSON queries and pw-metadata for setting the default sink.")]
pub struct Args {
    /// Invocation parameters (key=value pairs joined by '|')
    #[arg(value_name = "PARAMS")]
    pub params: Option<String>,

    /// Keep logs on stderr instead of the log file (interactive mode)
    #[arg(short, long)]
    pub foreground: bool,

    /// Log level: error, warn, info, debug, trace (overrides the config file)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Settings file to use instead of the XDG default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List active playback devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Output the device list as JSON
    #[arg(long, requires = "list_devices")]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_params_positional() {
        let args = Args::parse_from(["audio-switcher", "switch=1|headphones=A|speakers=B C"]);
        assert_eq!(args.params.as_deref(), Some("switch=1|headphones=A|speakers=B C"));
        assert!(!args.foreground);
    }

    #[test]
    fn test_json_requires_list_devices() {
        assert!(Args::try_parse_from(["audio-switcher", "--json"]).is_err());
        assert!(Args::try_parse_from(["audio-switcher", "--list-devices", "--json"]).is_ok());
    }
}
