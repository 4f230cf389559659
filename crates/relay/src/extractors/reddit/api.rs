// ABOUTME: Minimal Reddit OAuth API client: application-only token, thread listing, morechildren.
// ABOUTME: Also holds the serde shapes of the listing JSON the extractor consumes.

use serde::Deserialize;
use serde_json::Value;

use crate::config::RedditCredentials;
use crate::error::RelayError;

/// Upper bound Reddit accepts for ids in one `morechildren` call.
pub const MORECHILDREN_BATCH: usize = 100;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A `{kind, data}` envelope; the payload is decoded once the kind is known.
#[derive(Debug, Clone, Deserialize)]
pub struct RawThing {
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<RawThing>,
}

/// `t3` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// `t1` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Either an empty string or a nested `Listing`.
    #[serde(default)]
    pub replies: Value,
}

/// `more` payload: a placeholder for comments not included in the response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoreData {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub children: Vec<String>,
}

/// A decoded listing child.
#[derive(Debug, Clone)]
pub enum Thing {
    Link(LinkData),
    Comment(CommentData),
    More(MoreData),
    Other(String),
}

impl RawThing {
    pub fn decode(self) -> Result<Thing, serde_json::Error> {
        Ok(match self.kind.as_str() {
            "t3" => Thing::Link(serde_json::from_value(self.data)?),
            "t1" => Thing::Comment(serde_json::from_value(self.data)?),
            "more" => Thing::More(serde_json::from_value(self.data)?),
            _ => Thing::Other(self.kind),
        })
    }
}

impl CommentData {
    /// The nested reply listing, if any.
    pub fn take_replies(&mut self) -> Vec<RawThing> {
        match std::mem::take(&mut self.replies) {
            value @ Value::Object(_) => listing_children(value),
            _ => Vec::new(),
        }
    }
}

/// Children of a `{kind: "Listing", data: {children}}` value; empty for anything else.
pub fn listing_children(value: Value) -> Vec<RawThing> {
    serde_json::from_value::<RawThing>(value)
        .ok()
        .filter(|t| t.kind == "Listing")
        .and_then(|t| serde_json::from_value::<ListingData>(t.data).ok())
        .map(|l| l.children)
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenJson {
    #[serde(default)]
    errors: Vec<Value>,
    #[serde(default)]
    data: Option<MoreChildrenData>,
}

#[derive(Debug, Default, Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<RawThing>,
}

/// An authenticated session against the OAuth API.
#[derive(Debug, Clone)]
pub struct RedditApi {
    http: reqwest::Client,
    api_base: String,
    user_agent: String,
    token: String,
}

impl RedditApi {
    /// Obtain an application-only token and return a ready client.
    pub async fn connect(
        http: &reqwest::Client,
        auth_base: &str,
        api_base: &str,
        credentials: &RedditCredentials,
    ) -> Result<Self, RelayError> {
        let token_url = format!("{}/api/v1/access_token", auth_base.trim_end_matches('/'));
        let response = http
            .post(&token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(reqwest::header::USER_AGENT, &credentials.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| RelayError::from_reqwest(&token_url, "token request failed", e))?;

        let response = check_status(&token_url, "token request failed", response)?;
        let token: TokenResponse = response.json().await.map_err(|e| {
            RelayError::api(&token_url, "token request failed", Some(e.into()))
        })?;

        tracing::debug!("obtained reddit application token");
        Ok(Self {
            http: http.clone(),
            api_base: api_base.trim_end_matches('/').to_string(),
            user_agent: credentials.user_agent.clone(),
            token: token.access_token,
        })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, RelayError> {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(query)
            .send()
            .await
            .map_err(|e| RelayError::from_reqwest(&url, "request failed", e))?;

        let response = check_status(&url, "request failed", response)?;
        response
            .json()
            .await
            .map_err(|e| RelayError::api(&url, "unexpected response", Some(e.into())))
    }

    /// Fetch a thread: the submission plus the top of its comment forest.
    ///
    /// With `focus` set, the listing is rooted at that comment (used for
    /// "continue this thread" stubs); the title slug is a placeholder.
    pub async fn thread(
        &self,
        submission_id: &str,
        focus: Option<&str>,
    ) -> Result<(LinkData, Vec<RawThing>), RelayError> {
        let path = match focus {
            Some(comment) => format!("/comments/{}/_/{}", submission_id, comment),
            None => format!("/comments/{}", submission_id),
        };
        let value = self.get_json(&path, &[("raw_json", "1")]).await?;

        let mut listings = match value {
            Value::Array(items) => items.into_iter(),
            _ => {
                return Err(RelayError::api(
                    &path,
                    "unexpected response",
                    Some(anyhow::anyhow!("expected a pair of listings")),
                ))
            }
        };

        let link = listings
            .next()
            .map(listing_children)
            .unwrap_or_default()
            .into_iter()
            .find_map(|raw| match raw.decode() {
                Ok(Thing::Link(link)) => Some(link),
                _ => None,
            })
            .ok_or_else(|| {
                RelayError::api(&path, "unexpected response", Some(anyhow::anyhow!("submission not found")))
            })?;

        let comments = listings.next().map(listing_children).unwrap_or_default();
        Ok((link, comments))
    }

    /// Expand one batch of `more` ids. Returns a flat list in display order.
    pub async fn more_children(
        &self,
        link_fullname: &str,
        ids: &[String],
    ) -> Result<Vec<RawThing>, RelayError> {
        let children = ids.join(",");
        let value = self
            .get_json(
                "/api/morechildren",
                &[
                    ("api_type", "json"),
                    ("link_id", link_fullname),
                    ("children", children.as_str()),
                    ("limit_children", "false"),
                    ("raw_json", "1"),
                ],
            )
            .await?;

        let parsed: MoreChildrenResponse = serde_json::from_value(value).map_err(|e| {
            RelayError::api("/api/morechildren", "unexpected response", Some(e.into()))
        })?;
        if !parsed.json.errors.is_empty() {
            return Err(RelayError::api(
                "/api/morechildren",
                "API error",
                Some(anyhow::anyhow!("{:?}", parsed.json.errors)),
            ));
        }
        Ok(parsed.json.data.unwrap_or_default().things)
    }
}

fn check_status(
    url: &str,
    message: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, RelayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let cause = match status.as_u16() {
        401 | 403 => anyhow::anyhow!("HTTP status {} (check credentials)", status.as_u16()),
        429 => anyhow::anyhow!("HTTP status 429 (rate limited)"),
        code => anyhow::anyhow!("HTTP status {}", code),
    };
    Err(RelayError::api(url, message, Some(cause)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_children_ignores_non_listings() {
        assert!(listing_children(json!("")).is_empty());
        assert!(listing_children(json!({"kind": "t1", "data": {}})).is_empty());
        let children = listing_children(json!({
            "kind": "Listing",
            "data": {"children": [{"kind": "t1", "data": {"name": "t1_a"}}]}
        }));
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn decode_dispatches_on_kind() {
        let raw: RawThing = serde_json::from_value(json!({
            "kind": "more",
            "data": {"id": "m", "parent_id": "t3_x", "count": 2, "children": ["a", "b"]}
        }))
        .unwrap();
        match raw.decode().unwrap() {
            Thing::More(more) => assert_eq!(more.children, vec!["a", "b"]),
            other => panic!("unexpected {:?}", other),
        }

        let raw: RawThing = serde_json::from_value(json!({"kind": "t5", "data": {}})).unwrap();
        assert!(matches!(raw.decode().unwrap(), Thing::Other(kind) if kind == "t5"));
    }

    #[test]
    fn take_replies_handles_empty_string_and_listing() {
        let mut leaf: CommentData =
            serde_json::from_value(json!({"name": "t1_a", "replies": ""})).unwrap();
        assert!(leaf.take_replies().is_empty());

        let mut parent: CommentData = serde_json::from_value(json!({
            "name": "t1_b",
            "replies": {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {"name": "t1_c"}}
            ]}}
        }))
        .unwrap();
        assert_eq!(parent.take_replies().len(), 1);
    }
}
