/// Path of the room page. Serves the full page, the room fragments, and accepts message and invite POSTs.
pub const DISPLAY_PATH: &str = "/n2n-chat/display/";

/// Path of the main page. Serves the invitation table fragment and handles invitation answers.
pub const MAIN_PAGE_PATH: &str = "/n2n-chat/main-page/";

/// Value sent with a fragment selector to ask for the fragment only.
pub const ONLY: &str = "only";

/// Joins a base url such as `http://127.0.0.1:8888/` with one of the endpoint paths.
pub fn url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// A site-relative link to one of the endpoint paths, with the query percent-encoded.
pub fn link(path: &str, query: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();

    format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        assert_eq!(
            url("http://localhost:8888/", DISPLAY_PATH),
            "http://localhost:8888/n2n-chat/display/"
        );
        assert_eq!(
            url("http://localhost:8888", MAIN_PAGE_PATH),
            "http://localhost:8888/n2n-chat/main-page/"
        );
    }

    #[test]
    fn test_link_encodes_the_query() {
        assert_eq!(link(DISPLAY_PATH, &[("room", "1")]), "/n2n-chat/display/?room=1");
        assert_eq!(
            link(MAIN_PAGE_PATH, &[("accept", "a b&c")]),
            "/n2n-chat/main-page/?accept=a+b%26c"
        );
    }
}
