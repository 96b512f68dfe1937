//! Command-line parsing and validation for the badpower watchdog.
//!
//! The flag grammar is the watchdog's long-standing external surface:
//! single-dash multi-character flags (`-ip`, `-wait_min`), help spelled
//! `-?` / `/?` / `?`, and tolerance for unrecognized flags. A flag token
//! consumes the following token as its value unless that token itself looks
//! like a flag or the list ends there, in which case the flag is boolean.
//! Unrecognized flags and stray tokens are collected as warnings, never
//! rejections.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Tokens that request the usage text.
pub const HELP_TOKENS: [&str; 3] = ["-?", "/?", "?"];

const KNOWN_FLAGS: [&str; 8] = [
    "-ip",
    "-mac",
    "-wait_min",
    "-uptime_min",
    "-exec",
    "-pathlog",
    "-prefix",
    "-clear",
];

/// Characters stripped from a user-supplied `-prefix` value.
const ILLEGAL_PREFIX_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Errors from argument validation.
///
/// Messages name the offending flag; validation stops at the first
/// violation, before any file or network side effect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("invalid or missing -ip parameter")]
    InvalidIp,

    #[error("invalid or missing -mac parameter")]
    InvalidMac,

    #[error("invalid or missing -wait_min parameter (expected a positive integer)")]
    InvalidWaitMin,

    #[error("invalid or missing -uptime_min parameter (expected a positive integer)")]
    InvalidUptimeMin,

    #[error("missing -exec command")]
    MissingExec,

    #[error("missing -pathlog parameter")]
    MissingLogPath,
}

/// Raw result of scanning the argument tokens, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArgs {
    values: HashMap<String, String>,
    /// Non-fatal parse observations, replayed into the run log later.
    pub warnings: Vec<String>,
    /// Help requested (explicitly, or by invoking with no arguments).
    pub help: bool,
}

impl RawArgs {
    /// Value of a flag, if the flag was present.
    pub fn get(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    /// Whether a flag was present at all (possibly with an empty value).
    pub fn has(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }
}

/// Validated watchdog configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Target IPv4 address, dotted quad.
    pub ip: String,
    /// Expected hardware address, normalized to uppercase.
    pub mac: String,
    /// Minutes of allowed absence before recovery may fire.
    pub wait_min: u64,
    /// Minimum system uptime in minutes before recovery may fire.
    pub uptime_min: u64,
    /// Shell command to run when both thresholds are met.
    pub exec: String,
    /// Directory holding the state file and monthly logs.
    pub log_dir: PathBuf,
    /// Filename-safe target identifier.
    pub prefix: String,
    /// Delete the state file when recovery fires.
    pub clear: bool,
}

/// Scan raw argument tokens into a flag map.
///
/// Help detection runs over the whole token list first, so a bare `?` is a
/// help request even where value consumption would otherwise swallow it.
pub fn scan_tokens(tokens: &[String]) -> RawArgs {
    let mut raw = RawArgs::default();

    if tokens.is_empty() || tokens.iter().any(|t| HELP_TOKENS.contains(&t.as_str())) {
        raw.help = true;
        return raw;
    }

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];

        if !token.starts_with('-') {
            raw.warnings.push(format!("ignoring stray argument '{token}'"));
            i += 1;
            continue;
        }

        let value = match tokens.get(i + 1) {
            Some(next) if !next.starts_with('-') => {
                i += 1;
                next.clone()
            }
            _ => String::new(),
        };

        if !KNOWN_FLAGS.contains(&token.as_str()) {
            raw.warnings.push(format!("unknown flag '{token}' ignored"));
        }
        raw.values.insert(token.clone(), value);
        i += 1;
    }

    raw
}

/// Validate scanned arguments into a [`WatchConfig`].
///
/// Order: IP, MAC, wait threshold, uptime threshold, exec command, log path.
pub fn validate(raw: &RawArgs) -> Result<WatchConfig, CliError> {
    let ip = raw
        .get("-ip")
        .filter(|v| is_valid_ip(v))
        .ok_or(CliError::InvalidIp)?
        .to_string();

    let mac = raw
        .get("-mac")
        .filter(|v| is_valid_mac(v))
        .ok_or(CliError::InvalidMac)?
        .to_uppercase();

    let wait_min = raw
        .get("-wait_min")
        .and_then(parse_positive)
        .ok_or(CliError::InvalidWaitMin)?;

    let uptime_min = raw
        .get("-uptime_min")
        .and_then(parse_positive)
        .ok_or(CliError::InvalidUptimeMin)?;

    let exec = raw
        .get("-exec")
        .filter(|v| !v.is_empty())
        .ok_or(CliError::MissingExec)?
        .to_string();

    let log_dir = raw
        .get("-pathlog")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(CliError::MissingLogPath)?;

    let prefix = match raw.get("-prefix").map(sanitize_prefix) {
        // A prefix of nothing but illegal characters falls back to the
        // address-derived identifier.
        Some(p) if !p.is_empty() => p,
        _ => ip.replace('.', "_"),
    };

    Ok(WatchConfig {
        ip,
        mac,
        wait_min,
        uptime_min,
        exec,
        log_dir,
        prefix,
        clear: raw.has("-clear"),
    })
}

fn ip_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|[01]?[0-9]?[0-9])$",
        )
        .expect("IP pattern")
    })
}

fn mac_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Six hex byte groups with a uniform dash or colon separator.
        Regex::new(r"^(?:[0-9A-Fa-f]{2}-){5}[0-9A-Fa-f]{2}$|^(?:[0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$")
            .expect("MAC pattern")
    })
}

/// Whether a string is a dotted-quad IPv4 address with in-range octets.
pub fn is_valid_ip(s: &str) -> bool {
    ip_pattern().is_match(s)
}

/// Whether a string is a six-group hardware address, dash or colon separated.
pub fn is_valid_mac(s: &str) -> bool {
    mac_pattern().is_match(s)
}

/// Full-token parse of a strictly positive integer.
fn parse_positive(s: &str) -> Option<u64> {
    s.parse::<u64>().ok().filter(|v| *v > 0)
}

/// Strip characters that are illegal in filenames.
pub fn sanitize_prefix(s: &str) -> String {
    s.chars().filter(|c| !ILLEGAL_PREFIX_CHARS.contains(c)).collect()
}

/// Usage text shown for help requests and empty invocations.
pub fn usage() -> String {
    "Usage: badpower [options]\n\
     \n\
     Required parameters:\n\
     \x20 -ip <ip_address>          Target device IPv4 address (e.g. 192.168.1.100)\n\
     \x20 -mac <mac_address>        Expected MAC address (e.g. AA-BB-CC-DD-EE-FF)\n\
     \x20 -wait_min <minutes>       Max allowed minutes without a successful check\n\
     \x20 -uptime_min <minutes>     Min system uptime in minutes before acting\n\
     \x20 -exec \"<command>\"         Command to execute when conditions are met\n\
     \x20 -pathlog <path>           Directory for log and timestamp files\n\
     \n\
     Optional:\n\
     \x20 -prefix <name>            Filename identifier (default: IP with dots replaced)\n\
     \x20 -clear                    Delete the timestamp file when the command fires\n\
     \x20 -? /? ?                   Show this help text\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn full_args() -> Vec<String> {
        tokens(&[
            "-ip", "192.168.1.10",
            "-mac", "90-4e-2b-ca-0a-53",
            "-wait_min", "120",
            "-uptime_min", "20",
            "-exec", "shutdown -h now",
            "-pathlog", "/var/log/watch",
        ])
    }

    fn parse_full() -> WatchConfig {
        validate(&scan_tokens(&full_args())).expect("valid config")
    }

    // ===========================================
    // Help detection
    // ===========================================

    #[test]
    fn test_empty_invocation_is_help() {
        let raw = scan_tokens(&[]);
        assert!(raw.help);
    }

    #[test]
    fn test_help_tokens() {
        for help in HELP_TOKENS {
            let raw = scan_tokens(&tokens(&[help]));
            assert!(raw.help, "token {help} should request help");
        }
    }

    #[test]
    fn test_help_anywhere_wins() {
        let mut args = full_args();
        args.push("/?".to_string());
        let raw = scan_tokens(&args);
        assert!(raw.help);
    }

    #[test]
    fn test_bare_question_mark_after_flag_is_help() {
        // Help detection runs before value consumption.
        let raw = scan_tokens(&tokens(&["-ip", "?"]));
        assert!(raw.help);
    }

    #[test]
    fn test_usage_mentions_every_flag() {
        let text = usage();
        for flag in ["-ip", "-mac", "-wait_min", "-uptime_min", "-exec", "-pathlog", "-prefix", "-clear"] {
            assert!(text.contains(flag), "usage should mention {flag}");
        }
    }

    // ===========================================
    // Token scanning
    // ===========================================

    #[test]
    fn test_flag_consumes_next_token() {
        let raw = scan_tokens(&tokens(&["-ip", "10.0.0.1"]));
        assert_eq!(raw.get("-ip"), Some("10.0.0.1"));
    }

    #[test]
    fn test_flag_followed_by_flag_is_empty() {
        let raw = scan_tokens(&tokens(&["-clear", "-ip", "10.0.0.1"]));
        assert_eq!(raw.get("-clear"), Some(""));
        assert_eq!(raw.get("-ip"), Some("10.0.0.1"));
    }

    #[test]
    fn test_flag_at_end_is_empty() {
        let raw = scan_tokens(&tokens(&["-clear"]));
        assert_eq!(raw.get("-clear"), Some(""));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let raw = scan_tokens(&tokens(&["-ip", "10.0.0.1", "-ip", "10.0.0.2"]));
        assert_eq!(raw.get("-ip"), Some("10.0.0.2"));
    }

    #[test]
    fn test_unknown_flag_warns_but_parses() {
        let raw = scan_tokens(&tokens(&["-verbose", "-ip", "10.0.0.1"]));
        assert_eq!(raw.get("-ip"), Some("10.0.0.1"));
        assert_eq!(raw.warnings.len(), 1);
        assert!(raw.warnings[0].contains("-verbose"));
    }

    #[test]
    fn test_unknown_flag_consumes_its_value() {
        let raw = scan_tokens(&tokens(&["-speed", "fast", "-ip", "10.0.0.1"]));
        assert_eq!(raw.get("-speed"), Some("fast"));
        assert_eq!(raw.get("-ip"), Some("10.0.0.1"));
        assert_eq!(raw.warnings.len(), 1);
    }

    #[test]
    fn test_stray_token_warns() {
        let raw = scan_tokens(&tokens(&["10.0.0.1", "-ip", "10.0.0.2"]));
        assert_eq!(raw.get("-ip"), Some("10.0.0.2"));
        assert_eq!(raw.warnings.len(), 1);
        assert!(raw.warnings[0].contains("stray"));
    }

    #[test]
    fn test_no_warnings_for_clean_invocation() {
        let raw = scan_tokens(&full_args());
        assert!(raw.warnings.is_empty());
    }

    // ===========================================
    // IP validation
    // ===========================================

    #[test]
    fn test_valid_ips() {
        for ip in ["0.0.0.0", "127.0.0.1", "192.168.1.10", "255.255.255.255", "1.2.3.4"] {
            assert!(is_valid_ip(ip), "{ip} should be valid");
        }
    }

    #[test]
    fn test_octet_out_of_range() {
        for ip in ["256.0.0.1", "1.2.3.256", "300.1.1.1", "1.999.1.1"] {
            assert!(!is_valid_ip(ip), "{ip} should be rejected");
        }
    }

    #[test]
    fn test_wrong_segment_count() {
        for ip in ["1.2.3", "1.2.3.4.5", "1.2", "1", ""] {
            assert!(!is_valid_ip(ip), "{ip:?} should be rejected");
        }
    }

    #[test]
    fn test_ip_with_junk() {
        for ip in ["a.b.c.d", "1.2.3.x", " 1.2.3.4", "1.2.3.4 ", "1,2,3,4"] {
            assert!(!is_valid_ip(ip), "{ip:?} should be rejected");
        }
    }

    #[test]
    fn test_missing_ip_rejected() {
        let mut args = full_args();
        args.drain(0..2);
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidIp);
    }

    #[test]
    fn test_invalid_ip_rejected() {
        let mut args = full_args();
        args[1] = "999.1.1.1".to_string();
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidIp);
    }

    // ===========================================
    // MAC validation
    // ===========================================

    #[test]
    fn test_valid_macs() {
        for mac in [
            "90-4E-2B-CA-0A-53",
            "90-4e-2b-ca-0a-53",
            "aa-bb-cc-dd-ee-ff",
            "00:11:22:33:44:55",
            "AA:BB:CC:DD:EE:FF",
        ] {
            assert!(is_valid_mac(mac), "{mac} should be valid");
        }
    }

    #[test]
    fn test_invalid_macs() {
        for mac in [
            "90-4E-2B-CA-0A",          // five groups
            "90-4E-2B-CA-0A-53-11",    // seven groups
            "904E2BCA0A53",            // no separators
            "90-4E-2B-CA-0A-5",        // short group
            "90-4E-2B-CA-0A-533",      // long group
            "9G-4E-2B-CA-0A-53",       // non-hex
            "90-4E-2B:CA-0A-53",       // mixed separators
            "",
        ] {
            assert!(!is_valid_mac(mac), "{mac:?} should be rejected");
        }
    }

    #[test]
    fn test_mac_normalized_to_uppercase() {
        let config = parse_full();
        assert_eq!(config.mac, "90-4E-2B-CA-0A-53");
    }

    #[test]
    fn test_missing_mac_rejected() {
        let mut args = full_args();
        args.drain(2..4);
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidMac);
    }

    // ===========================================
    // Threshold validation
    // ===========================================

    #[test]
    fn test_thresholds_parsed() {
        let config = parse_full();
        assert_eq!(config.wait_min, 120);
        assert_eq!(config.uptime_min, 20);
    }

    #[test]
    fn test_zero_wait_min_rejected() {
        let mut args = full_args();
        args[5] = "0".to_string();
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidWaitMin);
    }

    #[test]
    fn test_non_numeric_wait_min_rejected() {
        let mut args = full_args();
        args[5] = "soon".to_string();
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidWaitMin);
    }

    #[test]
    fn test_trailing_junk_wait_min_rejected() {
        let mut args = full_args();
        args[5] = "12x".to_string();
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidWaitMin);
    }

    #[test]
    fn test_negative_uptime_min_rejected() {
        // "-5" looks like a flag, so -uptime_min ends up with an empty value.
        let mut args = full_args();
        args[7] = "-5".to_string();
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidUptimeMin);
    }

    #[test]
    fn test_zero_uptime_min_rejected() {
        let mut args = full_args();
        args[7] = "0".to_string();
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidUptimeMin);
    }

    // ===========================================
    // Exec and log path
    // ===========================================

    #[test]
    fn test_missing_exec_rejected() {
        let mut args = full_args();
        args.drain(8..10);
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::MissingExec);
    }

    #[test]
    fn test_empty_exec_rejected() {
        // -exec immediately followed by another flag parses as empty.
        let args = tokens(&[
            "-ip", "192.168.1.10",
            "-mac", "90-4E-2B-CA-0A-53",
            "-wait_min", "120",
            "-uptime_min", "20",
            "-exec",
            "-pathlog", "/var/log/watch",
        ]);
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::MissingExec);
    }

    #[test]
    fn test_missing_pathlog_rejected() {
        let mut args = full_args();
        args.drain(10..12);
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::MissingLogPath);
    }

    #[test]
    fn test_exec_command_preserved_verbatim() {
        let config = parse_full();
        assert_eq!(config.exec, "shutdown -h now");
    }

    #[test]
    fn test_validation_order_reports_first_violation() {
        // Both IP and MAC are bad; IP is checked first.
        let args = tokens(&["-ip", "bad", "-mac", "also-bad"]);
        let err = validate(&scan_tokens(&args)).unwrap_err();
        assert_eq!(err, CliError::InvalidIp);
    }

    // ===========================================
    // Prefix handling
    // ===========================================

    #[test]
    fn test_default_prefix_derived_from_ip() {
        let config = parse_full();
        assert_eq!(config.prefix, "192_168_1_10");
    }

    #[test]
    fn test_explicit_prefix_kept() {
        let mut args = full_args();
        args.extend(tokens(&["-prefix", "router-attic"]));
        let config = validate(&scan_tokens(&args)).expect("valid");
        assert_eq!(config.prefix, "router-attic");
    }

    #[test]
    fn test_prefix_sanitized() {
        let mut args = full_args();
        args.extend(tokens(&["-prefix", "up<stairs>:rack"]));
        let config = validate(&scan_tokens(&args)).expect("valid");
        assert_eq!(config.prefix, "upstairsrack");
    }

    #[test]
    fn test_all_illegal_prefix_falls_back_to_ip() {
        let mut args = full_args();
        args.extend(tokens(&["-prefix", "<>:|"]));
        let config = validate(&scan_tokens(&args)).expect("valid");
        assert_eq!(config.prefix, "192_168_1_10");
    }

    #[test]
    fn test_sanitize_prefix_strips_each_illegal_char() {
        assert_eq!(sanitize_prefix(r#"a\b/c:d*e?f"g<h>i|j"#), "abcdefghij");
        assert_eq!(sanitize_prefix("plain"), "plain");
    }

    // ===========================================
    // Clear flag
    // ===========================================

    #[test]
    fn test_clear_absent_by_default() {
        let config = parse_full();
        assert!(!config.clear);
    }

    #[test]
    fn test_clear_present() {
        let mut args = full_args();
        args.push("-clear".to_string());
        let config = validate(&scan_tokens(&args)).expect("valid");
        assert!(config.clear);
    }

    #[test]
    fn test_clear_with_consumed_value_still_counts() {
        let mut args = tokens(&["-clear", "yes"]);
        args.extend(full_args());
        let config = validate(&scan_tokens(&args)).expect("valid");
        assert!(config.clear);
    }

    // ===========================================
    // Error display
    // ===========================================

    #[test]
    fn test_error_messages_name_the_flag() {
        assert!(CliError::InvalidIp.to_string().contains("-ip"));
        assert!(CliError::InvalidMac.to_string().contains("-mac"));
        assert!(CliError::InvalidWaitMin.to_string().contains("-wait_min"));
        assert!(CliError::InvalidUptimeMin.to_string().contains("-uptime_min"));
        assert!(CliError::MissingExec.to_string().contains("-exec"));
        assert!(CliError::MissingLogPath.to_string().contains("-pathlog"));
    }
}
