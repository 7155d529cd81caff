pub mod models;

pub use color_eyre::{
    eyre::{bail, eyre as err, Context, Report},
    install,
};

#[twelf::config]
pub struct Conf {
    /// Path of the JSON document holding every tracked series
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Starter document copied into place when the data file does not exist yet
    #[serde(default = "default_seed_file")]
    pub seed_file: String,

    /// Directory holding `index.html`, `admin.html` and the `media` folder
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Address the web server listens on
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_data_file() -> String {
    "data/data.json".into()
}

fn default_seed_file() -> String {
    "data.default.json".into()
}

fn default_static_dir() -> String {
    ".".into()
}

fn default_address() -> String {
    "127.0.0.1:5000".into()
}
