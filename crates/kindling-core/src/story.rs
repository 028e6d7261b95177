use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Render format for story timestamps: ISO-8601 with an explicit offset,
/// second precision, always UTC.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Item detail payload as returned by the upstream API.
///
/// Upstream omits fields freely (dead items carry almost nothing), so every
/// field falls back to its default when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub title: Option<String>,
    pub url: Option<String>,
    pub by: Option<String>,
    /// Creation time in unix seconds.
    pub time: i64,
    pub score: i64,
    /// Total comment count, including nested replies.
    pub descendants: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Client-facing story shape, a pure projection of [`RawItem`].
///
/// Absent text fields project to empty strings, absent numerics to zero.
/// This is what the aggregator caches and what the gateway serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryView {
    pub title: String,
    pub uri: String,
    pub posted_by: String,
    /// ISO-8601 instant with offset, e.g. `2024-03-01T17:05:09+00:00`.
    pub time: String,
    pub score: i64,
    pub comment_count: i64,
}

impl From<&RawItem> for StoryView {
    fn from(item: &RawItem) -> Self {
        Self {
            title: item.title.clone().unwrap_or_default(),
            uri: item.url.clone().unwrap_or_default(),
            posted_by: item.by.clone().unwrap_or_default(),
            time: render_time(item.time),
            score: item.score,
            comment_count: item.descendants,
        }
    }
}

/// Renders unix seconds as an ISO-8601 string in UTC.
///
/// Out-of-range inputs clamp to the unix epoch.
fn render_time(unix_seconds: i64) -> String {
    let timestamp = Timestamp::from_second(unix_seconds).unwrap_or(Timestamp::UNIX_EPOCH);
    timestamp
        .to_zoned(TimeZone::UTC)
        .strftime(TIME_FORMAT)
        .to_string()
}
