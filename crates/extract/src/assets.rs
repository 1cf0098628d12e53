//! Embedded assets for extraction.
//!
//! The readability script is embedded into the binary at compile time using
//! [`rust-embed`](rust_embed), so a deployment only needs node.js and the
//! script's npm packages, not a checkout of the repository.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;
use std::borrow::Cow;
use std::io::Write;
use tempfile::NamedTempFile;

pub(crate) const READABILITY_SCRIPT: &str = "readability.js";

#[derive(Embed)]
#[folder = "../../assets/"]
pub(crate) struct Scripts;
impl Scripts {
    pub(crate) fn load(name: impl AsRef<str>) -> Result<Cow<'static, [u8]>> {
        Self::get(name.as_ref())
            .map(|f| f.data)
            .ok_or_raise(|| ErrorKind::AssetNotFound(format!("builtin:{}", name.as_ref())))
    }

    /// Write a builtin script to a temporary `.js` file; the file is removed
    /// when the returned handle is dropped.
    pub(crate) fn materialize(name: impl AsRef<str>) -> Result<NamedTempFile> {
        let data = Self::load(name)?;
        let mut file = tempfile::Builder::new().suffix(".js").tempfile().or_raise(|| ErrorKind::Io)?;
        file.write_all(&data).or_raise(|| ErrorKind::Io)?;
        file.flush().or_raise(|| ErrorKind::Io)?;
        Ok(file)
    }
}
