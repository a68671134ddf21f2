//! The post record shown on each slide.
//!
//! `Item` is what every [`DataSource`](super::DataSource) produces and what
//! the cache stores. The wire shape of a post (as returned by a WordPress
//! `wp/v2/posts` endpoint) is validated here: an element that lacks a
//! required field is rejected instead of being rendered half-empty.
//!
//! ## Required fields
//!
//! | JSON field       | Accepted shapes                                   |
//! |------------------|---------------------------------------------------|
//! | `id`             | unsigned integer                                  |
//! | `title`          | string, or `{ "rendered": string }`               |
//! | `link`           | string                                            |
//! | `date`           | `YYYY-MM-DDTHH:MM:SS` or RFC 3339                 |
//! | `featured_media` | optional; integer media id or string URL          |

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A single post, decoded and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Post id assigned by the remote site.
    pub id: u64,

    pub title: Title,

    /// Permalink to the full post.
    pub link: String,

    /// Publication time as the site reports it (site-local, no offset).
    pub published_at: NaiveDateTime,

    /// `None` when the post has no featured image.
    pub featured_image: Option<FeaturedImage>,
}

/// A post title in both its raw (entity-encoded) and display forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub raw: String,
    pub display: String,
}

impl Title {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let display = decode_entities(&raw);
        Self { raw, display }
    }
}

/// Reference to a post's featured image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeaturedImage {
    /// WordPress attachment id.
    MediaId(u64),
    Url(String),
}

impl std::fmt::Display for FeaturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MediaId(id) => write!(f, "media #{id}"),
            Self::Url(url) => f.write_str(url),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire schema
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WirePost {
    id: u64,
    title: WireTitle,
    link: String,
    date: String,
    #[serde(default)]
    featured_media: Option<WireMedia>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTitle {
    Plain(String),
    Rendered { rendered: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireMedia {
    Id(u64),
    Url(String),
}

impl Item {
    /// Validate one element of a posts array.
    ///
    /// `index` is the element's position, used only for the error message.
    pub fn from_json(index: usize, value: serde_json::Value) -> Result<Self, FetchError> {
        let post: WirePost =
            serde_json::from_value(value).map_err(|e| FetchError::decode_at(index, e.to_string()))?;

        let published_at = parse_post_date(&post.date)
            .ok_or_else(|| FetchError::decode_at(index, format!("invalid date '{}'", post.date)))?;

        let raw_title = match post.title {
            WireTitle::Plain(s) => s,
            WireTitle::Rendered { rendered } => rendered,
        };

        // WordPress reports "no featured image" as media id 0.
        let featured_image = match post.featured_media {
            Some(WireMedia::Id(0)) | None => None,
            Some(WireMedia::Url(url)) if url.is_empty() => None,
            Some(WireMedia::Id(id)) => Some(FeaturedImage::MediaId(id)),
            Some(WireMedia::Url(url)) => Some(FeaturedImage::Url(url)),
        };

        Ok(Self {
            id: post.id,
            title: Title::new(raw_title),
            link: post.link,
            published_at,
            featured_image,
        })
    }
}

/// WordPress `date` fields carry no offset; anything with one is accepted as
/// RFC 3339 and kept in its own local time.
fn parse_post_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
}

// ---------------------------------------------------------------------------
// HTML entity decoding
// ---------------------------------------------------------------------------

/// Longest entity name we try to match, e.g. `#x1F600` or `hellip`.
const MAX_ENTITY_LEN: usize = 10;

/// Replace HTML character references with the characters they stand for.
///
/// Unknown or malformed references are left as they are.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&tail[1..=end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 2..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '–',
        "mdash" => '—',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "hellip" => '…',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        _ => return None,
    };
    Some(c)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::NaiveDate;

    /// Shorthand constructor for tests.
    pub fn make_item(id: u64, title: &str) -> Item {
        Item {
            id,
            title: Title::new(title),
            link: format!("https://example.test/{id}"),
            published_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            featured_image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::make_item;
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn make_item_uses_decoded_title() {
        let item = make_item(1, "Fish &amp; Chips");
        assert_eq!(item.title.display, "Fish & Chips");
    }

    #[test]
    fn rendered_title_object_is_accepted() {
        let value = json!({
            "id": 42,
            "title": { "rendered": "Hello &#8211; World" },
            "link": "https://example.test/hello",
            "date": "2024-03-05T10:20:30",
            "featured_media": 17
        });

        let item = Item::from_json(0, value).unwrap();
        assert_eq!(item.id, 42);
        assert_eq!(item.title.raw, "Hello &#8211; World");
        assert_eq!(item.title.display, "Hello – World");
        assert_eq!(item.link, "https://example.test/hello");
        assert_eq!(
            item.published_at,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(10, 20, 30).unwrap()
        );
        assert_eq!(item.featured_image, Some(FeaturedImage::MediaId(17)));
    }

    #[test]
    fn plain_string_title_and_url_image() {
        let value = json!({
            "id": 1,
            "title": "Plain",
            "link": "https://example.test/1",
            "date": "2024-03-05T10:20:30+02:00",
            "featured_media": "https://example.test/img.png"
        });

        let item = Item::from_json(0, value).unwrap();
        assert_eq!(item.title.display, "Plain");
        assert_eq!(item.published_at.to_string(), "2024-03-05 10:20:30");
        assert_eq!(
            item.featured_image,
            Some(FeaturedImage::Url("https://example.test/img.png".into()))
        );
    }

    #[test]
    fn zero_media_id_means_no_image() {
        let value = json!({
            "id": 1,
            "title": "No image",
            "link": "https://example.test/1",
            "date": "2024-03-05T10:20:30",
            "featured_media": 0
        });
        assert!(Item::from_json(0, value).unwrap().featured_image.is_none());
    }

    #[test]
    fn missing_featured_media_is_allowed() {
        let value = json!({
            "id": 1,
            "title": "No image",
            "link": "https://example.test/1",
            "date": "2024-03-05T10:20:30"
        });
        assert!(Item::from_json(0, value).unwrap().featured_image.is_none());
    }

    #[test]
    fn missing_link_is_rejected_with_index() {
        let value = json!({
            "id": 1,
            "title": "No link",
            "date": "2024-03-05T10:20:30"
        });

        match Item::from_json(3, value) {
            Err(FetchError::Decode { index, reason }) => {
                assert_eq!(index, Some(3));
                assert!(reason.contains("link"), "reason was: {reason}");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_rejected() {
        let value = json!({
            "id": 1,
            "title": "Bad date",
            "link": "https://example.test/1",
            "date": "yesterday"
        });
        assert!(matches!(
            Item::from_json(0, value),
            Err(FetchError::Decode { index: Some(0), .. })
        ));
    }

    #[test]
    fn title_of_wrong_shape_is_rejected() {
        let value = json!({
            "id": 1,
            "title": { "raw": "only raw" },
            "link": "https://example.test/1",
            "date": "2024-03-05T10:20:30"
        });
        assert!(Item::from_json(0, value).is_err());
    }

    // -- entities ------------------------------------------------------------

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &amp; c"), "a <b> & c");
        assert_eq!(decode_entities("It&#8217;s"), "It’s");
        assert_eq!(decode_entities("It&#x2019;s"), "It’s");
        assert_eq!(decode_entities("Wait&hellip;"), "Wait…");
    }

    #[test]
    fn leaves_unknown_or_unterminated_entities_alone() {
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("&;"), "&;");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn decodes_adjacent_entities() {
        assert_eq!(decode_entities("&amp;&amp;"), "&&");
    }
}
