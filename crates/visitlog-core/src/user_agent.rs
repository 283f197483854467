use std::sync::LazyLock;

use regex::Regex;

/// Placeholder reported for browser and OS when the parser cannot tell.
pub const UNKNOWN_FAMILY: &str = "Other";

// woothee's marker for fields it could not identify.
const PARSER_UNKNOWN: &str = "UNKNOWN";

/// Device label when no rule in [`DEVICE_RULES`] matches.
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// What a visit records about the client software.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub browser: String,
    pub os: String,
    pub device: String,
}

/// One step of the device classification chain.
///
/// `detect` decides whether the rule applies; `extract` then produces the
/// label and never fails (each rule has its own generic fallback).
pub struct DeviceRule {
    pub name: &'static str,
    detect: Regex,
    extract: fn(&str) -> String,
}

impl DeviceRule {
    pub fn matches(&self, user_agent: &str) -> bool {
        self.detect.is_match(user_agent)
    }

    pub fn extract(&self, user_agent: &str) -> String {
        (self.extract)(user_agent)
    }
}

// Model stops at the next `;` or `)` so trailing product tokens are not captured.
static ANDROID_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Android\s+([\d.]+);\s+([^;)]+)").expect("android model pattern")
});

static IOS_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((iPhone|iPad|iPod).*?;\s([^)]+)\)").expect("ios model pattern")
});

/// Device rules in priority order; the first rule whose `detect` matches wins.
pub static DEVICE_RULES: LazyLock<Vec<DeviceRule>> = LazyLock::new(|| {
    vec![
        DeviceRule {
            name: "desktop",
            detect: Regex::new(r"(?i)Windows|Mac OS|Linux").expect("desktop pattern"),
            extract: |_| "Desktop".to_string(),
        },
        DeviceRule {
            name: "android",
            detect: Regex::new(r"(?i)Android").expect("android pattern"),
            extract: android_model,
        },
        DeviceRule {
            name: "ios",
            detect: Regex::new(r"(?i)iPhone|iPad|iPod").expect("ios pattern"),
            extract: ios_model,
        },
    ]
});

fn android_model(user_agent: &str) -> String {
    ANDROID_MODEL
        .captures(user_agent)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().trim())
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Android Device".to_string())
}

fn ios_model(user_agent: &str) -> String {
    IOS_MODEL
        .captures(user_agent)
        .and_then(|caps| {
            let token = caps.get(1)?.as_str();
            let model = caps.get(2)?.as_str().trim();
            Some(format!("{token} {model}"))
        })
        .unwrap_or_else(|| "iOS Device".to_string())
}

/// Derive the device label from a raw `User-Agent` header value.
pub fn classify_device(user_agent: &str) -> String {
    DEVICE_RULES
        .iter()
        .find(|rule| rule.matches(user_agent))
        .map(|rule| rule.extract(user_agent))
        .unwrap_or_else(|| UNKNOWN_DEVICE.to_string())
}

/// Parse a `User-Agent` header into browser family, OS string and device label.
///
/// Browser and OS come from `woothee`; anything it cannot identify (including
/// the empty string) is reported as [`UNKNOWN_FAMILY`]. Never fails.
pub fn classify(user_agent: &str) -> UserAgentInfo {
    let parsed = woothee::parser::Parser::new().parse(user_agent);

    let (browser, os) = match parsed {
        Some(result) => {
            let os = known_or_other(result.os);
            let os_version = known_or_other(&result.os_version);
            let os = if os != UNKNOWN_FAMILY && os_version != UNKNOWN_FAMILY {
                format!("{os} {os_version}")
            } else {
                os
            };
            (known_or_other(result.name), os)
        }
        None => (UNKNOWN_FAMILY.to_string(), UNKNOWN_FAMILY.to_string()),
    };

    UserAgentInfo {
        browser,
        os,
        device: classify_device(user_agent),
    }
}

fn known_or_other(value: &str) -> String {
    if value.is_empty() || value == PARSER_UNKNOWN {
        UNKNOWN_FAMILY.to_string()
    } else {
        value.to_string()
    }
}
