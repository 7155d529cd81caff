mod de;

use seriale_common::models::{Category, Document, Series, MAX_SEASONS};
use seriale_store::{Storage, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    #[error("series `{0}` not found")]
    SeriesNotFound(String),

    #[error("season {season:?} of `{title}` not found")]
    SeasonNotFound { title: String, season: Option<i64> },

    #[error("season count {0} is above the limit of {}", MAX_SEASONS)]
    TooManySeasons(i64),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct SetAboutText {
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct AddSeries {
    #[serde(rename = "kategoria")]
    pub category: Option<String>,
    #[serde(rename = "tytul")]
    pub title: Option<String>,
    #[serde(rename = "img")]
    pub image_ref: Option<String>,
    #[serde(rename = "data")]
    pub release_date: Option<String>,
    /// Defaults to a single season.
    #[serde(rename = "liczba_sezonow", default, deserialize_with = "de::lenient_int")]
    pub season_count: Option<i64>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct UpdateSeason {
    #[serde(rename = "kategoria")]
    pub category: Option<String>,
    #[serde(rename = "tytul")]
    pub title: Option<String>,
    #[serde(rename = "numer_sezonu", default, deserialize_with = "de::lenient_int")]
    pub season_number: Option<i64>,
    pub status: Option<String>,
}

/// Addresses a single series, used by delete and toggle.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct SeriesRef {
    #[serde(rename = "kategoria")]
    pub category: Option<String>,
    #[serde(rename = "tytul")]
    pub title: Option<String>,
}

fn resolve(category: Option<&str>) -> Result<Category, CollectionError> {
    match category {
        None => Ok(Category::default()),
        Some(name) => {
            Category::parse(name).ok_or_else(|| CollectionError::UnknownCategory(name.to_string()))
        }
    }
}

// An absent title never matches, even a series stored with an empty one.
fn position(collection: &[Series], title: Option<&str>) -> Option<usize> {
    let title = title?;

    collection.iter().position(|series| series.title == title)
}

/// Returns the document ready for display.
///
/// Every series gets an explicit `favorite` flag and both collections are
/// ordered newest first. None of this is written back.
#[tracing::instrument(skip(store))]
pub fn get_all<S>(store: &S) -> Document
where
    S: Storage + ?Sized,
{
    let mut document = store.load();

    for collection in [&mut document.series, &mut document.mini_series] {
        for series in collection.iter_mut() {
            series.favorite.get_or_insert(false);
        }

        // `sort_by` is stable, so equal dates keep their stored order.
        collection.sort_by(|a, b| b.sort_date().cmp(a.sort_date()));
    }

    document
}

#[tracing::instrument(skip(store, req), err)]
pub fn set_about_text<S>(store: &S, req: SetAboutText) -> Result<(), CollectionError>
where
    S: Storage + ?Sized,
{
    let mut document = store.load();

    document.about_text = req.text.unwrap_or_default();

    store.save(&document)?;

    Ok(())
}

/// Appends a new series to the end of its collection and returns the
/// collection it went into.
#[tracing::instrument(skip(store, req), err)]
pub fn add_series<S>(store: &S, req: AddSeries) -> Result<Category, CollectionError>
where
    S: Storage + ?Sized,
{
    let category = resolve(req.category.as_deref())?;

    let season_count = req.season_count.unwrap_or(1);
    if season_count > i64::from(MAX_SEASONS) {
        return Err(CollectionError::TooManySeasons(season_count));
    }

    let mut document = store.load();

    let series = Series::new(
        req.title.unwrap_or_default(),
        req.image_ref,
        req.release_date,
        season_count,
    );

    tracing::info!(
        category = %category,
        title = %series.title,
        seasons = series.seasons.len(),
        "adding series"
    );

    document.collection_mut(category).push(series);

    store.save(&document)?;

    Ok(category)
}

#[tracing::instrument(skip(store, req), err)]
pub fn update_season_status<S>(store: &S, req: UpdateSeason) -> Result<(), CollectionError>
where
    S: Storage + ?Sized,
{
    let category = resolve(req.category.as_deref())?;

    let mut document = store.load();
    let collection = document.collection_mut(category);

    let index = position(collection, req.title.as_deref())
        .ok_or_else(|| CollectionError::SeriesNotFound(req.title.clone().unwrap_or_default()))?;
    let series = &mut collection[index];

    let season = series
        .seasons
        .iter()
        .position(|season| Some(i64::from(season.number)) == req.season_number)
        .ok_or_else(|| CollectionError::SeasonNotFound {
            title: series.title.clone(),
            season: req.season_number,
        })?;

    series.seasons[season].status = req.status.unwrap_or_default();

    store.save(&document)?;

    Ok(())
}

/// Removes the first series with a matching title.
#[tracing::instrument(skip(store, req), err)]
pub fn delete_series<S>(store: &S, req: SeriesRef) -> Result<(), CollectionError>
where
    S: Storage + ?Sized,
{
    let category = resolve(req.category.as_deref())?;

    let mut document = store.load();
    let collection = document.collection_mut(category);

    let index = position(collection, req.title.as_deref())
        .ok_or_else(|| CollectionError::SeriesNotFound(req.title.unwrap_or_default()))?;

    let removed = collection.remove(index);

    tracing::info!(category = %category, title = %removed.title, "deleted series");

    store.save(&document)?;

    Ok(())
}

/// Flips the favorite flag and returns its new value.
#[tracing::instrument(skip(store, req), err)]
pub fn toggle_favorite<S>(store: &S, req: SeriesRef) -> Result<bool, CollectionError>
where
    S: Storage + ?Sized,
{
    let category = resolve(req.category.as_deref())?;

    let mut document = store.load();
    let collection = document.collection_mut(category);

    let index = position(collection, req.title.as_deref())
        .ok_or_else(|| CollectionError::SeriesNotFound(req.title.unwrap_or_default()))?;

    let series = &mut collection[index];
    let favorite = !series.is_favorite();
    series.favorite = Some(favorite);

    store.save(&document)?;

    Ok(favorite)
}
