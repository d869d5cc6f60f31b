//! File adapters over encode and decode.

use crate::converter::Converter;
use crate::error::{ConvertError, Result};
use crate::options::{DecodeOptions, EncodeOptions};
use extjson_types::ExtValue;
use std::fs;
use std::path::Path;
use tracing::debug;

impl Converter<'_> {
    /// Encodes `value` and writes the text to `path`.
    ///
    /// The file is only touched once encoding has succeeded, so a failed
    /// encode leaves an existing file intact. Use
    /// [`EncodeOptions::for_file`] for indented output.
    pub fn write_to_file(
        &self,
        value: &ExtValue,
        path: impl AsRef<Path>,
        options: &EncodeOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let text = self.encode(value, options)?;
        fs::write(path, text.as_bytes()).map_err(|source| ConvertError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }

    /// Reads `path` and decodes its contents.
    pub fn read_from_file(&self, path: impl AsRef<Path>, options: &DecodeOptions) -> Result<ExtValue> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConvertError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes from {}", text.len(), path.display());
        self.decode(&text, options)
    }
}
