use crate::config::StaticAssetsConfig;
use crate::service::Body;
use hyper::Response;
use shared::http::make_redirect_response;

/// Redirect to the placeholder asset for `name` at the requested size.
/// Placeholders only exist at the configured fixed sizes; without an exact
/// match the largest one is used.
pub fn redirect(config: &StaticAssetsConfig, name: &str, size: u32) -> Response<Body> {
    let chosen = if config.sizes.contains(&size) {
        size
    } else {
        config.sizes.iter().copied().max().unwrap_or(512)
    };
    make_redirect_response(&format!("{}/{}/{}.png", config.url_prefix, name, chosen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::LOCATION;

    #[test]
    fn test_exact_size() {
        let response = redirect(&StaticAssetsConfig::default(), "nobody", 80);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/static/img/nobody/80.png"
        );
    }

    #[test]
    fn test_unmatched_size_falls_back_to_largest() {
        let response = redirect(&StaticAssetsConfig::default(), "mm", 100);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/static/img/mm/512.png"
        );
    }
}
