use crate::{catalog::CatalogError, settings::SettingsError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `catalog` module")]
    Catalog(#[from] CatalogError),
    #[error("Error in the `settings` module")]
    Settings(#[from] SettingsError),
}
