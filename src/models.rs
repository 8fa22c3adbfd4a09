use serde::{Deserialize, Deserializer};

/// A single Hacker News story as returned by the Algolia search API.
/// Stories are immutable once fetched; `object_id` is their identity.
///
/// Algolia emits explicit `null` for fields a hit lacks (Ask HN stories
/// have no url, some hits carry null points), so the fields tolerate both
/// absent and null values.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Story {
    #[serde(default, deserialize_with = "null_to_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub topic: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub num_comments: u32,
    #[serde(default, deserialize_with = "null_to_default")]
    pub points: i64,
    // Algolia sends objectID as a decimal string
    #[serde(rename = "objectID", deserialize_with = "object_id_from_string")]
    pub object_id: u64,
}

fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn object_id_from_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<u64>().map_err(serde::de::Error::custom)
}

/// Top-level shape of the search endpoint response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<Story>,
}

/// State owned by the stories reducer. Mutated only through dispatched
/// actions, never directly by the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoriesState {
    pub data: Vec<Story>,
    pub is_loading: bool,
    pub is_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_algolia_hit() {
        let json = r#"{
            "title": "Rust 1.80 released",
            "url": "https://blog.rust-lang.org/",
            "author": "steveklabnik",
            "num_comments": 142,
            "points": 573,
            "objectID": "40087265"
        }"#;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.title, "Rust 1.80 released");
        assert_eq!(story.author, "steveklabnik");
        assert_eq!(story.num_comments, 142);
        assert_eq!(story.points, 573);
        assert_eq!(story.object_id, 40087265);
        assert_eq!(story.topic, "");
    }

    #[test]
    fn missing_fields_default() {
        // Ask HN posts have no url; some hits omit points entirely
        let json = r#"{
            "title": "Ask HN: How do you take notes?",
            "author": "qzw",
            "objectID": "123"
        }"#;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.url, "");
        assert_eq!(story.points, 0);
        assert_eq!(story.num_comments, 0);
        assert_eq!(story.object_id, 123);
    }

    #[test]
    fn null_fields_read_as_defaults() {
        // Algolia sends explicit nulls, not just absent keys
        let json = r#"{
            "title": "Ask HN: Who is hiring?",
            "url": null,
            "author": "whoishiring",
            "points": null,
            "num_comments": null,
            "objectID": "456"
        }"#;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.url, "");
        assert_eq!(story.points, 0);
        assert_eq!(story.num_comments, 0);
        assert_eq!(story.object_id, 456);
    }

    #[test]
    fn one_null_heavy_hit_does_not_sink_the_response() {
        let json = r#"{"hits": [
            {"title": "normal", "url": "https://example.com", "objectID": "1"},
            {"title": null, "url": null, "author": null, "points": null, "objectID": "2"}
        ]}"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[1].title, "");
        assert_eq!(response.hits[1].object_id, 2);
    }

    #[test]
    fn non_numeric_object_id_is_an_error() {
        let json = r#"{"title": "x", "objectID": "not-a-number"}"#;
        assert!(serde_json::from_str::<Story>(json).is_err());
    }

    #[test]
    fn parses_hits_envelope() {
        let json = r#"{"hits": [
            {"title": "a", "objectID": "1"},
            {"title": "b", "objectID": "2"}
        ], "nbHits": 2, "page": 0}"#;

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[1].object_id, 2);
    }
}
