use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    Geo(#[from] geojson::Error),
    #[error("dataset contains no usable rows")]
    EmptyDataset,
}

pub type Result<T> = std::result::Result<T, AtlasError>;
