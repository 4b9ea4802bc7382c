use csv::Error as CsvError;
use image::ImageError;
use std::io::Error as IoError;
use std::path::Display;
use thiserror::Error;
use toml::de::Error as TomlError;

#[derive(Error, Debug)]
pub enum IOEntry<'a> {
    #[error("Failed to create directory {0}: {1}")]
    CreateDirectoryError(Display<'a>, IoError),
    #[error("Failed to read directory {0}: {1}")]
    ReadDirectoryError(Display<'a>, IoError),
    #[error("Failed to read file {0}: {1}")]
    ReadFileError(Display<'a>, IoError),
    #[error("Failed to write file {0}: {1}")]
    WriteFileError(Display<'a>, IoError),
    #[error("Failed to get current directory: {0}")]
    CurrentDirectoryError(IoError),
    #[error("Failed to decode image {0}: {1}")]
    DecodeImageError(Display<'a>, ImageError),
    #[error("Failed to encode image {0}: {1}")]
    EncodeImageError(Display<'a>, ImageError),
    #[error("Failed to read CSV {0}: {1}")]
    ReadCsvError(Display<'a>, CsvError),
    #[error("Failed to write CSV {0}: {1}")]
    WriteCsvError(Display<'a>, CsvError),
    #[error("Failed to parse TOML {0}: {1}")]
    TomlDeserializeError(Display<'a>, TomlError),
}

impl From<IOEntry<'_>> for String {
    #[inline(always)]
    fn from(value: IOEntry) -> Self {
        value.to_string()
    }
}
