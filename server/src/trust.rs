use serde::Deserialize;
use url::Url;

/// One entry of the `trusted_default_urls` allow-list as it appears in the
/// config file. The legacy shape is a bare string meaning "URL prefix";
/// both shapes normalize to [`TrustRule`] at load time so matching has a
/// single code path.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TrustedUrlRule {
    Legacy(String),
    Rule(TrustRule),
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TrustRule {
    pub schemes: Option<Vec<String>>,
    pub host_equals: Option<String>,
    pub host_suffix: Option<String>,
    pub path_prefix: Option<String>,
    pub url_prefix: Option<String>,
}

impl TrustedUrlRule {
    pub fn normalize(&self) -> TrustRule {
        match self {
            TrustedUrlRule::Legacy(prefix) => TrustRule {
                url_prefix: Some(prefix.clone()),
                ..TrustRule::default()
            },
            TrustedUrlRule::Rule(rule) => rule.clone(),
        }
    }
}

pub fn normalize_rules(rules: &[TrustedUrlRule]) -> Vec<TrustRule> {
    rules.iter().map(TrustedUrlRule::normalize).collect()
}

/// Whether a caller-supplied redirect target is covered by the allow-list.
///
/// Rules are tried in order; all fields present on a rule must match for
/// that rule to accept, and the first accepting rule wins. Matching only
/// ever looks at the candidate's own parsed scheme/host/path, so a trusted
/// domain smuggled into the query string of an untrusted URL does not help.
pub fn is_trusted_url(url: &str, rules: &[TrustRule]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    for rule in rules {
        if let Some(schemes) = &rule.schemes
            && !schemes.iter().any(|scheme| scheme == parsed.scheme())
        {
            continue;
        }
        if let Some(host) = &rule.host_equals
            && parsed.host_str() != Some(host.as_str())
        {
            continue;
        }
        if let Some(suffix) = &rule.host_suffix
            && !parsed
                .host_str()
                .is_some_and(|candidate| candidate.ends_with(suffix))
        {
            continue;
        }
        if let Some(prefix) = &rule.path_prefix
            && !parsed.path().starts_with(prefix)
        {
            continue;
        }
        if let Some(prefix) = &rule.url_prefix
            && !url.starts_with(prefix)
        {
            continue;
        }
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gravatar_suffix_rule() -> Vec<TrustRule> {
        vec![TrustRule {
            schemes: Some(vec!["http".into(), "https".into()]),
            host_suffix: Some(".gravatar.com".into()),
            path_prefix: Some("/avatar/".into()),
            ..TrustRule::default()
        }]
    }

    #[test]
    fn test_exact_host_match() {
        let rules = vec![TrustRule {
            schemes: Some(vec!["http".into(), "https".into()]),
            host_equals: Some("gravatar.com".into()),
            path_prefix: Some("/avatar/".into()),
            ..TrustRule::default()
        }];
        assert!(is_trusted_url(
            "https://gravatar.com/avatar/63a75a80e6b1f4adfdb04c1ca02e596c",
            &rules
        ));
    }

    #[test]
    fn test_suffix_does_not_match_lookalike_domain() {
        assert!(!is_trusted_url(
            "https://gravatar.com.example.org/avatar/63a75a80e6b1f4adfdb04c1ca02e596c",
            &gravatar_suffix_rule()
        ));
    }

    #[test]
    fn test_trusted_url_in_query_string_is_not_trusted() {
        // Open-redirect payload: valid-looking URL hidden in the query
        assert!(!is_trusted_url(
            "https://github.com/SethFalco/?boop=https://secure.gravatar.com/avatar/205e460b479e2e5b48aec07710c08d50",
            &gravatar_suffix_rule()
        ));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            TrustRule {
                schemes: Some(vec!["https".into()]),
                host_equals: Some("ui-avatars.com".into()),
                path_prefix: Some("/api/".into()),
                ..TrustRule::default()
            },
            TrustRule {
                schemes: Some(vec!["http".into(), "https".into()]),
                host_suffix: Some(".gravatar.com".into()),
                path_prefix: Some("/avatar/".into()),
                ..TrustRule::default()
            },
        ];
        assert!(is_trusted_url("https://ui-avatars.com/api/blah", &rules));
    }

    #[test]
    fn test_scheme_mismatch_tries_next_rule() {
        let rules = vec![
            TrustRule {
                schemes: Some(vec!["https".into()]),
                host_equals: Some("example.org".into()),
                ..TrustRule::default()
            },
            TrustRule {
                schemes: Some(vec!["http".into()]),
                host_equals: Some("example.org".into()),
                ..TrustRule::default()
            },
        ];
        // Fails the first rule on scheme but is accepted by the second
        assert!(is_trusted_url("http://example.org/x", &rules));
    }

    #[test]
    fn test_legacy_string_rule() {
        let configured = vec![TrustedUrlRule::Legacy(
            "https://static.example.org/avatars/".into(),
        )];
        let rules = normalize_rules(&configured);
        assert!(is_trusted_url(
            "https://static.example.org/avatars/nobody.png",
            &rules
        ));
        assert!(!is_trusted_url("https://static.example.org/other/", &rules));
    }

    #[test]
    fn test_unparsable_and_empty() {
        let rules = gravatar_suffix_rule();
        assert!(!is_trusted_url("not a url", &rules));
        assert!(!is_trusted_url("", &rules));
        assert!(!is_trusted_url("https://example.org/x", &[]));
    }

    #[test]
    fn test_yaml_shapes() {
        let configured: Vec<TrustedUrlRule> = serde_yaml::from_str(
            r#"
- "https://legacy.example.org/avatar/"
- schemes: [https]
  host_equals: ui-avatars.com
  path_prefix: /api/
"#,
        )
        .unwrap();

        let rules = normalize_rules(&configured);
        assert_eq!(
            rules[0].url_prefix.as_deref(),
            Some("https://legacy.example.org/avatar/")
        );
        assert_eq!(rules[1].host_equals.as_deref(), Some("ui-avatars.com"));
    }
}
