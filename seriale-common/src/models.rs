use serde::{Deserialize as _, Deserializer};
use serde_json::{Map, Value};

/// Release date assumed for series that have none, so they sort as the oldest.
pub const FALLBACK_RELEASE_DATE: &str = "1900-01-01";

/// Largest number of seasons a single series may be created with.
pub const MAX_SEASONS: u32 = 1000;

/// Status given to every season of a freshly added series.
pub const NOT_WATCHED: &str = "not-watched";

/// The whole persisted state, read and written as one unit.
///
/// Keys the service does not know about are kept in `extra` so a
/// load followed by a save never drops anything.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "nullable")]
    pub about_text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub series: Vec<Series>,
    #[serde(default, deserialize_with = "nullable")]
    pub mini_series: Vec<Series>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn collection_mut(&mut self, category: Category) -> &mut Vec<Series> {
        match category {
            Category::Series => &mut self.series,
            Category::MiniSeries => &mut self.mini_series,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Series {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Absent until first toggled; readers treat absence as `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub seasons: Vec<Season>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Series {
    /// Builds a series with `season_count` unwatched seasons numbered from 1.
    ///
    /// A count of zero or less yields no seasons at all; counts above
    /// [`MAX_SEASONS`] are capped.
    pub fn new(
        title: String,
        image_ref: Option<String>,
        release_date: Option<String>,
        season_count: i64,
    ) -> Self {
        let count = season_count.clamp(0, i64::from(MAX_SEASONS)) as u32;

        Self {
            title,
            image_ref,
            release_date,
            favorite: None,
            seasons: (1..=count).map(Season::not_watched).collect(),
            extra: Map::new(),
        }
    }

    /// The date used for ordering, with missing or empty dates mapped to
    /// [`FALLBACK_RELEASE_DATE`].
    pub fn sort_date(&self) -> &str {
        match self.release_date.as_deref() {
            Some(date) if !date.is_empty() => date,
            _ => FALLBACK_RELEASE_DATE,
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite.unwrap_or(false)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Season {
    pub number: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
}

impl Season {
    pub fn not_watched(number: u32) -> Self {
        Self {
            number,
            status: NOT_WATCHED.into(),
        }
    }
}

/// One of the two lists of series held by a [`Document`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Category {
    #[default]
    Series,
    MiniSeries,
}

impl Category {
    /// Resolves a client supplied collection name.
    ///
    /// Besides the canonical names the Polish names used by the web
    /// client, and the document key spelling, are accepted.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "series" | "seriale" => Some(Category::Series),
            "mini-series" | "mini_series" | "miniseriale" => Some(Category::MiniSeries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Series => "series",
            Category::MiniSeries => "mini-series",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// `null` values written by older clients are read as the type's default
// instead of failing the whole document.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_series_numbers_seasons_from_one() {
        let series = Series::new("Dark".into(), None, Some("2017-12-01".into()), 3);

        let numbers: Vec<u32> = series.seasons.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(series.seasons.iter().all(|s| s.status == NOT_WATCHED));
        assert_eq!(series.favorite, None);
    }

    #[test]
    fn new_series_with_non_positive_count_has_no_seasons() {
        assert!(Series::new("A".into(), None, None, 0).seasons.is_empty());
        assert!(Series::new("B".into(), None, None, -4).seasons.is_empty());
    }

    #[test]
    fn new_series_caps_huge_season_counts() {
        let series = Series::new("X".into(), None, None, 4_000_000_000);

        assert_eq!(series.seasons.len(), MAX_SEASONS as usize);
        assert_eq!(series.seasons.last().map(|s| s.number), Some(MAX_SEASONS));
    }

    #[test]
    fn sort_date_falls_back_for_missing_and_empty_dates() {
        let mut series = Series::new("A".into(), None, None, 1);
        assert_eq!(series.sort_date(), FALLBACK_RELEASE_DATE);

        series.release_date = Some(String::new());
        assert_eq!(series.sort_date(), FALLBACK_RELEASE_DATE);

        series.release_date = Some("2021-05-05".into());
        assert_eq!(series.sort_date(), "2021-05-05");
    }

    #[test]
    fn category_accepts_client_aliases() {
        assert_eq!(Category::parse("series"), Some(Category::Series));
        assert_eq!(Category::parse("seriale"), Some(Category::Series));
        assert_eq!(Category::parse("mini-series"), Some(Category::MiniSeries));
        assert_eq!(Category::parse("miniseriale"), Some(Category::MiniSeries));
        assert_eq!(Category::parse("movies"), None);
        assert_eq!(Category::default(), Category::Series);
    }

    #[test]
    fn document_tolerates_nulls_and_missing_keys() {
        let document: Document = serde_json::from_str(
            r#"{
                "about_text": null,
                "series": [
                    { "title": "Sherlock", "image_ref": null, "seasons": [{ "number": 1, "status": null }] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(document.about_text, "");
        assert!(document.mini_series.is_empty());
        assert_eq!(document.series[0].seasons[0].status, "");
        assert_eq!(document.series[0].favorite, None);
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let raw = r#"{"about_text":"","series":[{"title":"X","image_ref":null,"release_date":null,"seasons":[],"note":"rewatch"}],"mini_series":[],"theme":"dark"}"#;

        let document: Document = serde_json::from_str(raw).unwrap();
        assert_eq!(document.extra.get("theme"), Some(&Value::from("dark")));

        let written = serde_json::to_value(&document).unwrap();
        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn missing_favorite_is_not_written_back() {
        let series = Series::new("X".into(), None, None, 1);
        let written = serde_json::to_value(&series).unwrap();

        assert!(written.get("favorite").is_none());
        assert!(!series.is_favorite());
    }
}
