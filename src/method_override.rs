use axum::extract::{Query, Request};
use axum::http::Method;
use serde::Deserialize;

/// Query string carrying the method a browser form wanted to use.
#[derive(Debug, Deserialize)]
struct MethodOverride {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// Rewrite `POST ...?_method=PUT|DELETE` into the named method.
///
/// HTML forms can only submit GET and POST. This runs before routing, so it
/// has to wrap the whole router rather than sit inside it as a layer.
pub fn override_method(mut req: Request) -> Request {
    if req.method() != Method::POST {
        return req;
    }

    let Ok(Query(query)) = Query::<MethodOverride>::try_from_uri(req.uri()) else {
        return req;
    };

    let target = match query.method.as_deref().map(str::to_ascii_uppercase).as_deref() {
        Some("PUT") => Method::PUT,
        Some("DELETE") => Method::DELETE,
        _ => return req,
    };

    tracing::debug!("Overriding POST {} as {}", req.uri().path(), target);
    *req.method_mut() = target;
    req
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::{delete, put};
    use axum::Router;
    use tower::util::MapRequestLayer;
    use tower::{Layer, ServiceExt};

    fn request(method: Method, uri: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_post_with_put_override() {
        let req = override_method(request(Method::POST, "/books/1?_method=PUT"));
        assert_eq!(req.method(), Method::PUT);
    }

    #[test]
    fn test_override_is_case_insensitive() {
        let req = override_method(request(Method::POST, "/books/1?_method=delete"));
        assert_eq!(req.method(), Method::DELETE);
    }

    #[test]
    fn test_other_methods_untouched() {
        let req = override_method(request(Method::GET, "/books/1?_method=DELETE"));
        assert_eq!(req.method(), Method::GET);

        let req = override_method(request(Method::POST, "/books/1?_method=PATCH"));
        assert_eq!(req.method(), Method::POST);

        let req = override_method(request(Method::POST, "/books"));
        assert_eq!(req.method(), Method::POST);
    }

    #[tokio::test]
    async fn test_override_reaches_route() {
        let router = Router::new()
            .route("/books/{id}", put(|| async { "updated" }))
            .route("/authors/{id}", delete(|| async { "removed" }));
        let app = MapRequestLayer::new(override_method).layer(router);

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/books/abc?_method=PUT"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = app
            .oneshot(request(Method::POST, "/authors/abc?_method=DELETE"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }
}
