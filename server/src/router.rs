use hyper::Method;

/// Which handler an incoming request maps to. Digest segments are passed
/// through verbatim: fingerprint validation happens in the pipeline, where
/// an invalid digest is simply an identity miss.
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Avatar { digest: String },
    /// OPTIONS on the avatar endpoint enumerates the default backends
    AvatarOptions,
    /// No digest at all: back to the home page
    AvatarBare,
    GravatarProxy { digest: String },
    ExternalProxy { digest: String },
    Stats,
    MethodNotAllowed,
    NotFound,
}

pub fn match_route(method: &Method, path: &str) -> Route {
    if let Some(digest) = strip_route_prefix(path, "/avatar") {
        return match *method {
            Method::OPTIONS => Route::AvatarOptions,
            Method::GET if digest.is_empty() => Route::AvatarBare,
            Method::GET => Route::Avatar {
                digest: digest.to_string(),
            },
            _ => Route::MethodNotAllowed,
        };
    }

    if let Some(digest) = strip_route_prefix(path, "/gravatarproxy") {
        return match *method {
            Method::GET => Route::GravatarProxy {
                digest: digest.to_string(),
            },
            _ => Route::MethodNotAllowed,
        };
    }

    if let Some(digest) = strip_route_prefix(path, "/externalproxy") {
        return match *method {
            Method::GET => Route::ExternalProxy {
                digest: digest.to_string(),
            },
            _ => Route::MethodNotAllowed,
        };
    }

    if path == "/stats" || path == "/stats/" {
        return match *method {
            Method::GET => Route::Stats,
            _ => Route::MethodNotAllowed,
        };
    }

    Route::NotFound
}

/// "/avatar" and "/avatar/" yield an empty remainder; "/avatarx" is not a
/// match. A remainder containing further slashes is rejected.
fn strip_route_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some("");
    }
    let rest = rest.strip_prefix('/')?;
    if rest.contains('/') {
        return None;
    }
    Some(rest)
}
