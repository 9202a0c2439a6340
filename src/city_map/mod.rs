use std::path::Path;

use gdal::Dataset;
use gdal::DatasetOptions;
use gdal::DriverManager;
use gdal::GdalOpenFlags;

use crate::commands::CityFieldsArg;
use crate::errors::CommandError;
use crate::progress::ProgressObserver;

pub(crate) mod fields;
pub(crate) mod city_layer;
pub(crate) mod qualifying_layer;

use city_layer::CityLayer;

/// The dataset the cities are read from. It's never written to.
pub(crate) struct CityMap {
    dataset: Dataset
}

impl CityMap {

    pub(crate) const fn new(dataset: Dataset) -> Self {
        Self {
            dataset
        }
    }

    pub(crate) fn open<FilePath: AsRef<Path>>(path: &FilePath) -> Result<Self,CommandError> {
        Ok(Self::new(Dataset::open_ex(path, DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_READONLY,
            ..Default::default()
        })?))
    }

    pub(crate) fn cities_layer(&self, layer_name: &str, field_names: &CityFieldsArg) -> Result<CityLayer<'_>,CommandError> {
        CityLayer::open_from_dataset(&self.dataset, layer_name, field_names)
    }

}

/// The dataset the qualifying cities are written to.
pub(crate) struct QualifyingMap {
    dataset: Dataset
}

impl QualifyingMap {

    // Only these drivers are trusted with transactions. Others either don't support them or emulate them by
    // rewriting the whole file.
    const TRANSACTION_DRIVERS: [&'static str; 3] = ["GPKG","SQLite","PostgreSQL"];

    pub(crate) const fn new(dataset: Dataset) -> Self {
        Self {
            dataset
        }
    }

    fn open_dataset<FilePath: AsRef<Path>>(path: &FilePath) -> Result<Dataset, CommandError> {
        Ok(Dataset::open_ex(path, DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_UPDATE | GdalOpenFlags::GDAL_OF_VECTOR,
            ..Default::default()
        })?)
    }

    pub(crate) fn edit<FilePath: AsRef<Path>>(path: &FilePath) -> Result<Self,CommandError> {
        Ok(Self::new(Self::open_dataset(path)?))
    }

    pub(crate) fn create_or_edit<FilePath: AsRef<Path>>(path: &FilePath, driver: &str) -> Result<Self,CommandError> {
        if path.as_ref().exists() {
            Self::edit(path)
        } else {
            let driver = DriverManager::get_driver_by_name(driver)?;
            let dataset = driver.create_vector_only(path)?;
            Ok(Self::new(dataset))
        }

    }

    fn supports_transactions(&self) -> bool {
        let driver = self.dataset.driver().short_name();
        Self::TRANSACTION_DRIVERS.contains(&driver.as_str())
    }

    pub(crate) fn with_transaction<ResultType, Callback: FnOnce(&mut Dataset) -> Result<ResultType,CommandError>>(&mut self, callback: Callback) -> Result<ResultType,CommandError> {
        if self.supports_transactions() {
            let mut transaction = self.dataset.start_transaction()?;
            match callback(&mut *transaction) {
                Ok(result) => {
                    transaction.commit()?;
                    Ok(result)
                },
                Err(err) => {
                    transaction.rollback()?;
                    Err(err)
                },
            }
        } else {
            callback(&mut self.dataset)
        }

    }

    pub(crate) fn save<Progress: ProgressObserver>(&mut self, progress: &mut Progress) -> Result<(),CommandError> {
        progress.start_unknown_endpoint(|| "Saving qualifying cities.");
        self.dataset.flush_cache()?;
        progress.finish(|| "Qualifying cities saved.");
        Ok(())
    }

}
