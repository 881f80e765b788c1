//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Claim the daily free ebook and download your claimed library.
///
/// Packtgrab logs into your account, optionally claims the currently
/// featured free ebook, and downloads claimed ebooks in the formats
/// you configured.
#[derive(Parser, Debug)]
#[command(name = "packtgrab")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Claim the daily free ebook
    #[arg(short, long)]
    pub grab: bool,

    /// Claim the daily free ebook and log its metadata
    #[arg(long)]
    pub grab_log: bool,

    /// Claim the daily free ebook, then download it
    #[arg(long)]
    pub grab_download: bool,

    /// Download every ebook on the account
    #[arg(long)]
    pub download_all: bool,

    /// Download the titles listed in the config file
    #[arg(long)]
    pub download_chosen: bool,

    /// Save each book into a subfolder named after it
    #[arg(short = 'f', long)]
    pub into_folder: bool,

    /// Path to the configuration file
    #[arg(short, long, default_value = "packtgrab.toml")]
    pub config: PathBuf,
}

impl Args {
    /// True when any claim action was requested.
    #[must_use]
    pub fn wants_grab(&self) -> bool {
        self.grab || self.grab_log || self.grab_download
    }

    /// True when any download action was requested.
    #[must_use]
    pub fn wants_download(&self) -> bool {
        self.grab_download || self.download_all || self.download_chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["packtgrab"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.wants_grab());
        assert!(!args.wants_download());
        assert_eq!(args.config, PathBuf::from("packtgrab.toml"));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["packtgrab", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["packtgrab", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_grab_flag_requests_grab_only() {
        let args = Args::try_parse_from(["packtgrab", "--grab"]).unwrap();
        assert!(args.wants_grab());
        assert!(!args.wants_download());
    }

    #[test]
    fn test_cli_grab_download_requests_both_actions() {
        let args = Args::try_parse_from(["packtgrab", "--grab-download"]).unwrap();
        assert!(args.wants_grab());
        assert!(args.wants_download());
    }

    #[test]
    fn test_cli_download_all_requests_download_only() {
        let args = Args::try_parse_from(["packtgrab", "--download-all"]).unwrap();
        assert!(!args.wants_grab());
        assert!(args.wants_download());
    }

    #[test]
    fn test_cli_into_folder_short_flag() {
        let args = Args::try_parse_from(["packtgrab", "--download-all", "-f"]).unwrap();
        assert!(args.into_folder);
    }

    #[test]
    fn test_cli_custom_config_path() {
        let args =
            Args::try_parse_from(["packtgrab", "-c", "/etc/packtgrab/account.toml"]).unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/packtgrab/account.toml"));
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let result = Args::try_parse_from(["packtgrab", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["packtgrab", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
