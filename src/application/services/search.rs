use crate::config::Config;
use crate::error::{body_excerpt, AppError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// One flattened hit from the instant-answer API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
    #[serde(rename = "Topics", default)]
    topics: Vec<RelatedTopic>,
}

/// Thin client for the DuckDuckGo instant-answer endpoint, used to give
/// the generator some current context per topic genre.
pub struct SearchClient {
    config: Arc<Config>,
    client: Client,
}

impl SearchClient {
    pub fn new(config: Arc<Config>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.platform.timeout))
            .build()?;
        Ok(Self { config, client })
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, AppError> {
        let url = format!("{}/", self.config.search.base_url.trim_end_matches('/'));
        debug!("Searching for {}", query);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Search request failed. Status: {}, Body: {}", status, body);
            return Err(AppError::Api(status, body_excerpt(&body)));
        }

        let answer: InstantAnswer = serde_json::from_str(&body)?;
        let mut results = Vec::new();

        if !answer.abstract_text.is_empty() {
            results.push(SearchResult {
                title: answer.heading,
                url: answer.abstract_url,
                snippet: answer.abstract_text,
            });
        }
        collect_topics(&answer.related_topics, &mut results, max_results);
        results.truncate(max_results);

        debug!("Search returned {} results", results.len());
        Ok(results)
    }
}

fn collect_topics(topics: &[RelatedTopic], results: &mut Vec<SearchResult>, max_results: usize) {
    for topic in topics {
        if results.len() >= max_results {
            return;
        }
        if !topic.topics.is_empty() {
            collect_topics(&topic.topics, results, max_results);
            continue;
        }
        if topic.text.is_empty() {
            continue;
        }
        let (title, snippet) = match topic.text.split_once(" - ") {
            Some((title, snippet)) => (title.to_string(), snippet.to_string()),
            None => (topic.text.clone(), String::new()),
        };
        results.push(SearchResult {
            title,
            url: topic.first_url.clone(),
            snippet,
        });
    }
}

#[cfg(test)]
mod tests_search_client {
    use super::*;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    fn create_test_config(server_url: &str) -> Config {
        let mut config = Config::new();
        config.search.base_url = server_url.to_string();
        config.platform.timeout = 30;
        config
    }

    fn create_client(server: &Server) -> SearchClient {
        SearchClient::new(Arc::new(create_test_config(&server.url()))).unwrap()
    }

    #[tokio::test]
    async fn test_search_flattens_topics() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "金融 ニュース".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("no_html".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "Heading": "金融",
                    "AbstractText": "概要テキスト",
                    "AbstractURL": "https://example.com/abstract",
                    "RelatedTopics": [
                        {"Text": "記事1 - 説明1", "FirstURL": "https://example.com/1"},
                        {"Name": "カテゴリ", "Topics": [
                            {"Text": "記事2 - 説明2", "FirstURL": "https://example.com/2"}
                        ]},
                        {"Text": "リンクだけ", "FirstURL": "https://example.com/3"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = create_client(&server);
        let results = client.search("金融 ニュース", 10).await.unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].title, "金融");
        assert_eq!(results[0].snippet, "概要テキスト");
        assert_eq!(results[1].title, "記事1");
        assert_eq!(results[1].snippet, "説明1");
        assert_eq!(results[2].title, "記事2");
        assert_eq!(results[3].title, "リンクだけ");
        assert_eq!(results[3].snippet, "");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{
                    "RelatedTopics": [
                        {"Text": "a - 1", "FirstURL": "u1"},
                        {"Text": "b - 2", "FirstURL": "u2"},
                        {"Text": "c - 3", "FirstURL": "u3"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = create_client(&server);
        let results = client.search("query", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "b");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_error_status() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = create_client(&server);
        let result = client.search("query", 5).await;

        match result {
            Err(AppError::Api(status, body)) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("expected Api error, got {:?}", other.map(|_| ())),
        }
        mock.assert_async().await;
    }
}
