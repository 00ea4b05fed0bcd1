//! Web page fetching and boilerplate stripping.

use itertools::Itertools;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_CHARSET, ACCEPT_LANGUAGE, USER_AGENT};
use scraper::Html;

use crate::ExtractError;

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Headers of a desktop browser; some sites refuse obvious bots.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.11 (KHTML, like Gecko) Chrome/23.0.1271.64 Safari/537.11",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_CHARSET,
        HeaderValue::from_static("ISO-8859-1,utf-8;q=0.7,*;q=0.3"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    headers
}

#[tracing::instrument(skip(client))]
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, ExtractError> {
    let resp = client
        .get(url)
        .headers(browser_headers())
        .send()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

    if !resp.status().is_success() {
        return Err(ExtractError::Status {
            status: resp.status().as_u16(),
            url: url.to_string(),
        });
    }

    Ok(resp.text().await?)
}

/// Returns the visible text of an HTML document, one block per line.
///
/// Lines are trimmed, runs of two spaces are treated as breaks between
/// headlines and blank lines are dropped.
pub fn html_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            raw.push_str(text);
        }
    }

    raw.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_and_styles_are_stripped() {
        let html = r#"
            <html>
                <head>
                    <title>Budget debate</title>
                    <style>body { color: red; }</style>
                    <script>var tracking = "nope";</script>
                </head>
                <body>
                    <p>The house met at noon.</p>
                    <noscript>Enable JavaScript</noscript>
                    <p>Members discussed the budget.</p>
                </body>
            </html>
        "#;

        let text = html_text(html);
        assert_eq!(
            text,
            "Budget debate\nThe house met at noon.\nMembers discussed the budget."
        );
    }

    #[test]
    fn test_double_spaces_split_headlines() {
        let html = "<div>Breaking  Markets rally</div>";
        assert_eq!(html_text(html), "Breaking\nMarkets rally");
    }

    #[test]
    fn test_empty_document_yields_empty_text() {
        assert!(html_text("<html><body>   </body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_fetch_html_reports_http_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/missing", server.url());
        let err = fetch_html(&client, &url).await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ExtractError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_html_sends_browser_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .match_header("accept-language", "en-US,en;q=0.8")
            .with_status(200)
            .with_body("<p>hello</p>")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let body = fetch_html(&client, &format!("{}/page", server.url()))
            .await
            .expect("fetch should succeed");

        mock.assert_async().await;
        assert_eq!(html_text(&body), "hello");
    }
}
