/// Return the four variants of an OpenID URL, ALWAYS in the same order:
/// - http w/ trailing slash
/// - http w/o trailing slash
/// - https w/ trailing slash
/// - https w/o trailing slash
///
/// Feeding any of the four variants back in reproduces the same array, so
/// digests computed at confirmation time keep matching at lookup time no
/// matter which variant a user registered.
pub fn openid_variations(openid: &str) -> [String; 4] {
    // Base version: http w/ trailing slash
    let mut base = if let Some(rest) = openid.strip_prefix("https://") {
        format!("http://{rest}")
    } else {
        openid.to_string()
    };
    if !base.ends_with('/') {
        base.push('/');
    }

    let http_no_slash = base[..base.len() - 1].to_string();
    let https = base.replacen("http://", "https://", 1);
    let https_no_slash = https[..https.len() - 1].to_string();

    [base, http_no_slash, https, https_no_slash]
}
