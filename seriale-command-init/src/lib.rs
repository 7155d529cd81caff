use seriale_common::{bail, Conf};
use seriale_store::{JsonStore, Readiness, Storage as _};

/// Prepares the data file ahead of the first `serve` and reports what it
/// holds.
#[tracing::instrument(skip(conf), err)]
pub fn run(conf: &Conf) -> Result<(), seriale_common::Report> {
    let store = JsonStore::from_conf(conf);

    let readiness = store.ensure_ready();
    if readiness == Readiness::Failed {
        bail!(
            "unable to prepare data file `{}`",
            store.data_file().display()
        );
    }

    let document = store.load();

    tracing::info!(
        data_file = %store.data_file().display(),
        readiness = ?readiness,
        series = document.series.len(),
        mini_series = document.mini_series.len(),
        "storage ready"
    );

    Ok(())
}
