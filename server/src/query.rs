use crate::config::AvatarConfig;
use url::form_urlencoded;

/// The query options an avatar request understands. Everything here parses
/// leniently: unknown keys are ignored and unusable values fall back to
/// their defaults rather than erroring.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryOptions {
    /// Requested square dimension, floored to the default and clamped to
    /// the configured maximum.
    pub size: u32,
    /// Fallback backend keyword, literal "404", or an external URL.
    pub default: Option<String>,
    /// `f=y`/`forcedefault=y`: skip a linked photo and force the fallback
    /// chain.
    pub forcedefault: bool,
    /// `gravatarredirect=y`: redirect straight to the remote service.
    pub gravatarredirect: bool,
    /// `gravatarproxy=n` disables proxying, going straight to the local
    /// generators/static fallback.
    pub gravatarproxy: bool,
}

impl QueryOptions {
    pub fn from_query(query: Option<&str>, config: &AvatarConfig) -> QueryOptions {
        let mut size_short = None;
        let mut size_long = None;
        let mut default_short = None;
        let mut default_long = None;
        let mut forcedefault = false;
        let mut gravatarredirect = false;
        let mut gravatarproxy = true;

        for (key, value) in form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "s" => size_short = Some(value.into_owned()),
                "size" => size_long = Some(value.into_owned()),
                "d" => default_short = Some(value.into_owned()),
                "default" => default_long = Some(value.into_owned()),
                "f" | "forcedefault" => {
                    if value == "y" {
                        forcedefault = true;
                    }
                }
                "gravatarredirect" => {
                    if value == "y" {
                        gravatarredirect = true;
                    }
                }
                "gravatarproxy" => {
                    if value == "n" {
                        gravatarproxy = false;
                    }
                }
                _ => {}
            }
        }

        // The long form wins when both are given
        let size = parse_size(size_long.or(size_short), config);
        let default = default_long.or(default_short);

        QueryOptions {
            size,
            default,
            forcedefault,
            gravatarredirect,
            gravatarproxy,
        }
    }
}

fn parse_size(raw: Option<String>, config: &AvatarConfig) -> u32 {
    let mut size = config.default_size;
    if let Some(raw) = raw
        && !raw.is_empty()
        && raw != "0"
        && let Ok(parsed) = raw.parse::<u32>()
        && parsed > 0
    {
        size = parsed;
    }
    size.min(config.max_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AvatarConfig {
        AvatarConfig::default()
    }

    fn parse(query: &str) -> QueryOptions {
        QueryOptions::from_query(Some(query), &config())
    }

    #[test]
    fn test_defaults() {
        let options = QueryOptions::from_query(None, &config());
        assert_eq!(options.size, 80);
        assert_eq!(options.default, None);
        assert!(!options.forcedefault);
        assert!(!options.gravatarredirect);
        assert!(options.gravatarproxy);
    }

    #[test]
    fn test_size_parsing() {
        assert_eq!(parse("s=128").size, 128);
        assert_eq!(parse("size=128").size, 128);
        // long form wins
        assert_eq!(parse("s=64&size=128").size, 128);
        assert_eq!(parse("size=128&s=64").size, 128);
        // unusable values fall back to the default
        assert_eq!(parse("s=").size, 80);
        assert_eq!(parse("s=0").size, 80);
        assert_eq!(parse("s=banana").size, 80);
        assert_eq!(parse("s=-5").size, 80);
        // clamped to the maximum
        assert_eq!(parse("s=9000").size, 512);
    }

    #[test]
    fn test_flags() {
        assert!(parse("f=y").forcedefault);
        assert!(parse("forcedefault=y").forcedefault);
        assert!(!parse("f=n").forcedefault);
        assert!(!parse("f=yes").forcedefault);
        assert!(parse("gravatarredirect=y").gravatarredirect);
        assert!(!parse("gravatarredirect=n").gravatarredirect);
        assert!(!parse("gravatarproxy=n").gravatarproxy);
        assert!(parse("gravatarproxy=y").gravatarproxy);
    }

    #[test]
    fn test_default_selection() {
        assert_eq!(parse("d=retro").default.as_deref(), Some("retro"));
        assert_eq!(parse("default=retro").default.as_deref(), Some("retro"));
        assert_eq!(
            parse("d=retro&default=monsterid").default.as_deref(),
            Some("monsterid")
        );
        // url-encoded external URL survives parsing
        assert_eq!(
            parse("d=https%3A%2F%2Fexample.org%2Fx").default.as_deref(),
            Some("https://example.org/x")
        );
    }
}
