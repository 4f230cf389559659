// ABOUTME: Reddit thread extractor: submission text plus every comment, fully expanded.
// ABOUTME: Talks to the OAuth API with application-only credentials supplied at construction.

//! Reddit extraction.
//!
//! A thread is fetched once, then every `more` placeholder is expanded in
//! FIFO order until none remain. Comments live in an arena ([`CommentTree`])
//! and are rendered depth-first, so arbitrarily deep threads are safe.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::classify::SiteKind;
use crate::config::RedditCredentials;
use crate::error::RelayError;
use crate::extractors::Extractor;
use crate::formats::rewrap;
use crate::result::Scraped;

pub mod api;
pub mod tree;

pub use api::{LinkData, RedditApi};
pub use tree::{CommentNode, CommentTree, MoreStub};

use api::{Thing, MORECHILDREN_BATCH};

const FAILURE_MESSAGE: &str = "Error scraping Reddit thread";
const DELETED_AUTHOR: &str = "[deleted]";

/// Extracts Reddit threads through the OAuth API.
#[derive(Debug, Clone)]
pub struct RedditExtractor {
    http: reqwest::Client,
    auth_base: String,
    api_base: String,
    credentials: RedditCredentials,
}

impl RedditExtractor {
    pub fn new(
        http: reqwest::Client,
        auth_base: impl Into<String>,
        api_base: impl Into<String>,
        credentials: RedditCredentials,
    ) -> Self {
        Self {
            http,
            auth_base: auth_base.into(),
            api_base: api_base.into(),
            credentials,
        }
    }

    async fn scrape(&self, url: &str) -> Result<Scraped, RelayError> {
        let id = submission_id(url).ok_or_else(|| {
            RelayError::invalid_url(url, "could not find a submission id in the URL", None)
        })?;

        let api =
            RedditApi::connect(&self.http, &self.auth_base, &self.api_base, &self.credentials)
                .await?;
        let (link, comments) = api.thread(&id, None).await?;
        let link_fullname = format!("t3_{}", if link.id.is_empty() { &id } else { &link.id });

        let mut tree = CommentTree::new();
        let mut pending: VecDeque<MoreStub> = tree.add_listing(comments, None).into();
        let mut requests = 0usize;

        while let Some(stub) = pending.pop_front() {
            match stub {
                MoreStub::Ids { parent, ids } => {
                    for batch in ids.chunks(MORECHILDREN_BATCH) {
                        requests += 1;
                        let things = api.more_children(&link_fullname, batch).await?;
                        pending.extend(tree.add_flat(things, parent));
                    }
                }
                MoreStub::Continue { parent, comment_id } => {
                    requests += 1;
                    let (_, listing) = api.thread(&id, Some(&comment_id)).await?;
                    let replies = focal_replies(listing, &comment_id);
                    pending.extend(tree.add_listing(replies, Some(parent)));
                }
            }
        }

        tracing::debug!(
            submission = %id,
            comments = tree.len(),
            expansion_requests = requests,
            "expanded reddit thread"
        );

        Ok(Scraped {
            title: (!link.title.is_empty()).then(|| link.title.clone()),
            url: url.to_string(),
            content: Some(build_content(&link, &tree)),
        })
    }
}

#[async_trait]
impl Extractor for RedditExtractor {
    fn kind(&self) -> SiteKind {
        SiteKind::Reddit
    }

    async fn extract(&self, url: &str) -> Result<Scraped, RelayError> {
        self.scrape(url)
            .await
            .map_err(|e| RelayError::extract(url, FAILURE_MESSAGE, Some(e.into())))
    }
}

/// Submission id of a thread URL: the segment after `comments`, or the
/// first path segment of a `redd.it` short link.
pub fn submission_id(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let id = if host == "redd.it" || host.ends_with(".redd.it") {
        segments.next()
    } else {
        segments.by_ref().find(|s| *s == "comments")?;
        segments.next()
    }?;
    Some(id.to_string())
}

/// Replies of the focused comment in a "continue this thread" listing.
fn focal_replies(listing: Vec<api::RawThing>, comment_id: &str) -> Vec<api::RawThing> {
    let fullname = format!("t1_{}", comment_id);
    listing
        .into_iter()
        .find_map(|raw| match raw.decode() {
            Ok(Thing::Comment(mut comment)) if comment.name == fullname => {
                Some(comment.take_replies())
            }
            _ => None,
        })
        .unwrap_or_default()
}

fn author_or_deleted(author: Option<&str>) -> &str {
    author.filter(|a| !a.is_empty()).unwrap_or(DELETED_AUTHOR)
}

/// Render the submission and its comments as plain text.
pub fn build_content(link: &LinkData, tree: &CommentTree) -> String {
    let mut content = format!(
        "Post content: {}\nPosted by: {}\n",
        link.selftext,
        author_or_deleted(link.author.as_deref())
    );
    let comments = tree
        .flatten()
        .into_iter()
        .map(|c| {
            format!(
                "Comment by {}: {}\n",
                author_or_deleted(c.author.as_deref()),
                rewrap(&c.body)
            )
        })
        .collect::<Vec<_>>();
    content.push_str(&comments.join("\n"));
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn credentials() -> RedditCredentials {
        RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "relay-tests/0.1".to_string(),
        }
    }

    fn extractor(server: &MockServer) -> RedditExtractor {
        RedditExtractor::new(
            reqwest::Client::new(),
            server.base_url(),
            server.base_url(),
            credentials(),
        )
    }

    fn comment(name: &str, parent: &str, author: Value, body: &str, replies: Value) -> Value {
        json!({
            "kind": "t1",
            "data": {"name": name, "parent_id": parent, "author": author, "body": body, "replies": replies}
        })
    }

    fn listing(children: Vec<Value>) -> Value {
        json!({"kind": "Listing", "data": {"children": children}})
    }

    fn thread_body(comments: Vec<Value>) -> String {
        json!([
            listing(vec![json!({
                "kind": "t3",
                "data": {"id": "abc", "title": "Thread title", "selftext": "Body text", "author": "op"}
            })]),
            listing(comments),
        ])
        .to_string()
    }

    fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/access_token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"access_token":"tok","token_type":"bearer"}"#);
        })
    }

    #[test]
    fn submission_id_from_comments_path() {
        assert_eq!(
            submission_id("https://www.reddit.com/r/rust/comments/abc123/some_title/"),
            Some("abc123".to_string())
        );
        assert_eq!(
            submission_id("https://old.reddit.com/comments/xyz"),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn submission_id_from_short_link() {
        assert_eq!(submission_id("https://redd.it/q1w2e3"), Some("q1w2e3".to_string()));
    }

    #[test]
    fn submission_id_missing() {
        assert_eq!(submission_id("https://www.reddit.com/r/rust/"), None);
        assert_eq!(submission_id("not a url"), None);
    }

    #[test]
    fn content_layout_and_deleted_authors() {
        let link = LinkData {
            id: "abc".to_string(),
            title: "T".to_string(),
            selftext: "Hello".to_string(),
            author: None,
        };
        let mut tree = CommentTree::new();
        let things = vec![
            comment("t1_a", "t3_abc", json!("alice"), "first\n\n  line two ", json!("")),
            comment("t1_b", "t3_abc", Value::Null, "second", json!("")),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();
        tree.add_listing(things, None);

        assert_eq!(
            build_content(&link, &tree),
            "Post content: Hello\nPosted by: [deleted]\n\
             Comment by alice: first line two\n\n\
             Comment by [deleted]: second\n"
        );
    }

    #[tokio::test]
    async fn extracts_thread_with_nested_comments() {
        let server = MockServer::start();
        let token = mock_token(&server);
        let thread = server.mock(|when, then| {
            when.method(GET)
                .path("/comments/abc")
                .query_param("raw_json", "1")
                .header("authorization", "Bearer tok");
            then.status(200)
                .header("content-type", "application/json")
                .body(thread_body(vec![
                    comment(
                        "t1_a",
                        "t3_abc",
                        json!("alice"),
                        "top",
                        listing(vec![comment("t1_a1", "t1_a", json!("bob"), "reply", json!(""))]),
                    ),
                    comment("t1_b", "t3_abc", json!("carol"), "sibling", json!("")),
                ]));
        });

        let url = "https://www.reddit.com/r/test/comments/abc/thread_title/";
        let scraped = extractor(&server).extract(url).await.unwrap();
        token.assert();
        thread.assert();

        assert_eq!(scraped.title.as_deref(), Some("Thread title"));
        assert_eq!(scraped.url, url);
        assert_eq!(
            scraped.content.as_deref(),
            Some(
                "Post content: Body text\nPosted by: op\n\
                 Comment by alice: top\n\n\
                 Comment by bob: reply\n\n\
                 Comment by carol: sibling\n"
            )
        );
    }

    #[tokio::test]
    async fn expands_more_and_continue_stubs() {
        let server = MockServer::start();
        mock_token(&server);
        server.mock(|when, then| {
            when.method(GET).path("/comments/abc");
            then.status(200)
                .header("content-type", "application/json")
                .body(thread_body(vec![
                    comment(
                        "t1_a",
                        "t3_abc",
                        json!("alice"),
                        "top",
                        listing(vec![json!({
                            "kind": "more",
                            "data": {"id": "_", "parent_id": "t1_a", "count": 0, "children": []}
                        })]),
                    ),
                    json!({
                        "kind": "more",
                        "data": {"id": "m1", "parent_id": "t3_abc", "count": 1, "children": ["c"]}
                    }),
                ]));
        });
        let more = server.mock(|when, then| {
            when.method(GET)
                .path("/api/morechildren")
                .query_param("link_id", "t3_abc")
                .query_param("children", "c");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    json!({"json": {"errors": [], "data": {"things": [
                        comment("t1_c", "t3_abc", json!("dave"), "loaded later", json!(""))
                    ]}}})
                    .to_string(),
                );
        });
        let focused = server.mock(|when, then| {
            when.method(GET).path("/comments/abc/_/a");
            then.status(200)
                .header("content-type", "application/json")
                .body(thread_body(vec![comment(
                    "t1_a",
                    "t3_abc",
                    json!("alice"),
                    "top",
                    listing(vec![comment("t1_a1", "t1_a", json!("erin"), "deep", json!(""))]),
                )]));
        });

        let scraped = extractor(&server)
            .extract("https://www.reddit.com/r/test/comments/abc/")
            .await
            .unwrap();
        more.assert();
        focused.assert();

        assert_eq!(
            scraped.content.as_deref(),
            Some(
                "Post content: Body text\nPosted by: op\n\
                 Comment by alice: top\n\n\
                 Comment by erin: deep\n\n\
                 Comment by dave: loaded later\n"
            )
        );
    }

    #[tokio::test]
    async fn rejected_credentials_fail_with_prefix() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/access_token");
            then.status(401);
        });

        let err = extractor(&server)
            .extract("https://www.reddit.com/r/test/comments/abc/")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Error scraping Reddit thread: "), "{}", message);
        assert!(message.contains("check credentials"), "{}", message);
    }

    #[tokio::test]
    async fn url_without_submission_id_fails_before_network() {
        let server = MockServer::start();
        let token = mock_token(&server);

        let err = extractor(&server)
            .extract("https://www.reddit.com/r/test/")
            .await
            .unwrap_err();
        token.assert_hits(0);
        assert!(err.to_string().starts_with("Error scraping Reddit thread: "));
    }
}
