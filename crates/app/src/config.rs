use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use scraper::{Html, Selector};
use thiserror::Error;

use crate::dom::MountSelector;
use discrail_core::types::discussion_number::DiscussionNumber;
use discrail_infra::fetch::READ_DEADLINE;
use discrail_infra::gateway::GRAPHQL_ENDPOINT;

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub discussion_number: DiscussionNumber,
    pub auth_token: String,
    pub mount_selector: MountSelector,
    pub api_base: String,
    pub graphql_endpoint: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub show_fallback: bool,
    pub compose_action: String,
    pub http_addr: SocketAddr,
}

/// Values taken from the command line; these win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub discussion: Option<String>,
    pub token: Option<String>,
    pub mount: Option<String>,
    pub api_base: Option<String>,
}

/// `data-discussion` / `data-token` found on a host page script tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptAttrs {
    pub discussion: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required value: {0}")]
    Missing(&'static str),
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl WidgetConfig {
    pub fn from_env(overrides: &Overrides, script: &ScriptAttrs) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides, script)
    }

    pub fn from_lookup<F>(
        lookup: F,
        overrides: &Overrides,
        script: &ScriptAttrs,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let discussion_raw = first_present([
            overrides.discussion.clone(),
            script.discussion.clone(),
            env.optional("DISCRAIL_DISCUSSION"),
        ])
        .ok_or(ConfigError::Missing("DISCRAIL_DISCUSSION"))?;
        let discussion_number = DiscussionNumber::try_from(discussion_raw.as_str())
            .map_err(|_| ConfigError::InvalidValue("DISCRAIL_DISCUSSION", discussion_raw.clone()))?;

        let auth_token = first_present([
            overrides.token.clone(),
            script.token.clone(),
            env.optional("DISCRAIL_TOKEN"),
        ])
        .ok_or(ConfigError::Missing("DISCRAIL_TOKEN"))?;

        let mount_raw = first_present([overrides.mount.clone(), env.optional("DISCRAIL_MOUNT")])
            .unwrap_or_else(|| ".rail".to_string());
        let mount_selector = mount_raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DISCRAIL_MOUNT", mount_raw.clone()))?;

        let api_base = first_present([overrides.api_base.clone(), env.optional("DISCRAIL_API_BASE")])
            .ok_or(ConfigError::Missing("DISCRAIL_API_BASE"))?;
        if !is_http_url(&api_base) {
            return Err(ConfigError::InvalidValue("DISCRAIL_API_BASE", api_base));
        }

        let graphql_endpoint = env.string("DISCRAIL_GRAPHQL_ENDPOINT", GRAPHQL_ENDPOINT);
        if !is_http_url(&graphql_endpoint) {
            return Err(ConfigError::InvalidValue(
                "DISCRAIL_GRAPHQL_ENDPOINT",
                graphql_endpoint,
            ));
        }
        let repo_owner = env
            .optional("DISCRAIL_REPO_OWNER")
            .ok_or(ConfigError::Missing("DISCRAIL_REPO_OWNER"))?;
        validate_repo_part("DISCRAIL_REPO_OWNER", &repo_owner)?;
        let repo_name = env
            .optional("DISCRAIL_REPO_NAME")
            .ok_or(ConfigError::Missing("DISCRAIL_REPO_NAME"))?;
        validate_repo_part("DISCRAIL_REPO_NAME", &repo_name)?;

        let read_timeout_ms = env.u64("DISCRAIL_READ_TIMEOUT_MS", READ_DEADLINE.as_millis() as u64)?;
        let write_timeout_ms = env.u64("DISCRAIL_WRITE_TIMEOUT_MS", read_timeout_ms)?;
        let show_fallback = env.bool("DISCRAIL_SHOW_FALLBACK", false)?;
        let compose_action = env.string("DISCRAIL_COMPOSE_ACTION", "/compose");
        if !compose_action.starts_with('/') || compose_action == "/" {
            return Err(ConfigError::InvalidValue(
                "DISCRAIL_COMPOSE_ACTION",
                compose_action,
            ));
        }
        let http_addr_raw = env.string("DISCRAIL_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;

        Ok(Self {
            discussion_number,
            auth_token,
            mount_selector,
            api_base,
            graphql_endpoint,
            repo_owner,
            repo_name,
            read_timeout: Duration::from_millis(read_timeout_ms),
            write_timeout: Duration::from_millis(write_timeout_ms),
            show_fallback,
            compose_action,
            http_addr,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &'static str) -> Option<String> {
        let value = (self.0)(key).unwrap_or_default();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn string(&self, key: &'static str, default: &'static str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn u64(&self, key: &'static str, default: u64) -> Result<u64, ConfigError> {
        let raw = self.string(key, "");
        if raw.is_empty() {
            return Ok(default);
        }
        raw.parse()
            .map_err(|_| ConfigError::InvalidNumber(key, raw))
    }

    fn bool(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.optional(key) {
            None => Ok(default),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue(key, raw)),
            },
        }
    }
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

fn validate_repo_part(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.')
    {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(key, value.to_string()))
    }
}

/// Reads the widget attributes off the first script tag carrying either one.
pub fn script_attrs(html: &str) -> ScriptAttrs {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("script[data-discussion], script[data-token]").expect("selector");
    let Some(script) = document.select(&selector).next() else {
        return ScriptAttrs::default();
    };
    let element = script.value();
    ScriptAttrs {
        discussion: element.attr("data-discussion").map(str::to_string),
        token: element.attr("data-token").map(str::to_string),
    }
}

pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents.lines().filter_map(parse_dotenv_line).collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), parse_dotenv_value(value.trim())))
}

fn parse_dotenv_value(value: &str) -> String {
    if let Some(stripped) = value.strip_prefix('"').and_then(|inner| inner.strip_suffix('"')) {
        return unescape_double_quoted(stripped);
    }
    if let Some(stripped) = value.strip_prefix('\'').and_then(|inner| inner.strip_suffix('\'')) {
        return stripped.to_string();
    }
    value.to_string()
}

fn unescape_double_quoted(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('t') => output.push('\t'),
            Some('\\') => output.push('\\'),
            Some('"') => output.push('"'),
            Some(other) => {
                output.push('\\');
                output.push(other);
            }
            None => output.push('\\'),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE_ENV: &[(&str, &str)] = &[
        ("DISCRAIL_DISCUSSION", "3"),
        ("DISCRAIL_TOKEN", "env-token"),
        ("DISCRAIL_API_BASE", "https://proxy.example"),
        ("DISCRAIL_REPO_OWNER", "octo-org"),
        ("DISCRAIL_REPO_NAME", "blog"),
    ];

    #[test]
    fn env_defaults() {
        let config =
            WidgetConfig::from_lookup(lookup(BASE_ENV), &Overrides::default(), &ScriptAttrs::default())
                .unwrap();
        assert_eq!(config.discussion_number.get(), 3);
        assert_eq!(config.auth_token, "env-token");
        assert_eq!(config.mount_selector, MountSelector::Class("rail".to_string()));
        assert_eq!(config.read_timeout, READ_DEADLINE);
        assert_eq!(config.write_timeout, READ_DEADLINE);
        assert_eq!(config.graphql_endpoint, GRAPHQL_ENDPOINT);
        assert_eq!(config.compose_action, "/compose");
        assert!(!config.show_fallback);
    }

    #[test]
    fn script_tag_beats_env_and_cli_beats_script_tag() {
        let script = ScriptAttrs {
            discussion: Some("12".to_string()),
            token: Some("page-token".to_string()),
        };
        let config =
            WidgetConfig::from_lookup(lookup(BASE_ENV), &Overrides::default(), &script).unwrap();
        assert_eq!(config.discussion_number.get(), 12);
        assert_eq!(config.auth_token, "page-token");

        let overrides = Overrides {
            discussion: Some("99".to_string()),
            mount: Some("#sidebar".to_string()),
            ..Overrides::default()
        };
        let config = WidgetConfig::from_lookup(lookup(BASE_ENV), &overrides, &script).unwrap();
        assert_eq!(config.discussion_number.get(), 99);
        assert_eq!(config.auth_token, "page-token");
        assert_eq!(config.mount_selector, MountSelector::Id("sidebar".to_string()));
    }

    #[test]
    fn rejects_unsafe_discussion_number() {
        let overrides = Overrides {
            discussion: Some("1) { id }".to_string()),
            ..Overrides::default()
        };
        let err = WidgetConfig::from_lookup(lookup(BASE_ENV), &overrides, &ScriptAttrs::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("DISCRAIL_DISCUSSION", _)));
    }

    #[test]
    fn missing_token_is_reported() {
        let env: Vec<(&str, &str)> = BASE_ENV
            .iter()
            .copied()
            .filter(|(key, _)| *key != "DISCRAIL_TOKEN")
            .collect();
        let err =
            WidgetConfig::from_lookup(lookup(&env), &Overrides::default(), &ScriptAttrs::default())
                .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DISCRAIL_TOKEN")));
    }

    #[test]
    fn rejects_bad_repo_and_timeouts() {
        let mut env = BASE_ENV.to_vec();
        env.push(("DISCRAIL_REPO_OWNER", "evil\"owner"));
        let err =
            WidgetConfig::from_lookup(lookup(&env), &Overrides::default(), &ScriptAttrs::default())
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("DISCRAIL_REPO_OWNER", _)));

        let mut env = BASE_ENV.to_vec();
        env.push(("DISCRAIL_READ_TIMEOUT_MS", "soon"));
        let err =
            WidgetConfig::from_lookup(lookup(&env), &Overrides::default(), &ScriptAttrs::default())
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber("DISCRAIL_READ_TIMEOUT_MS", _)));
    }

    #[test]
    fn reads_script_tag_attributes() {
        let attrs = script_attrs(
            r#"<html><head>
            <script src="/app.js"></script>
            <script src="/comments.js" data-token="ghp_x" data-discussion="42"></script>
            </head><body></body></html>"#,
        );
        assert_eq!(
            attrs,
            ScriptAttrs {
                discussion: Some("42".to_string()),
                token: Some("ghp_x".to_string()),
            }
        );
        assert_eq!(script_attrs("<p>no widget</p>"), ScriptAttrs::default());
    }

    #[test]
    fn parse_dotenv_line_basic() {
        let (key, value) = parse_dotenv_line("DISCRAIL_TOKEN=abc").unwrap();
        assert_eq!(key, "DISCRAIL_TOKEN");
        assert_eq!(value, "abc");
    }

    #[test]
    fn parse_dotenv_line_export_and_quotes() {
        let (key, value) = parse_dotenv_line(r#"export DISCRAIL_API_BASE="https://p.example""#).unwrap();
        assert_eq!(key, "DISCRAIL_API_BASE");
        assert_eq!(value, "https://p.example");
        let (_, value) = parse_dotenv_line("DISCRAIL_MOUNT='#side'").unwrap();
        assert_eq!(value, "#side");
    }

    #[test]
    fn parse_dotenv_line_comment() {
        assert!(parse_dotenv_line("# DISCRAIL_TOKEN=x").is_none());
        assert!(parse_dotenv_line("   ").is_none());
    }
}
