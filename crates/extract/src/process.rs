//! Extraction through an external Readability process.

use crate::assets::{READABILITY_SCRIPT, Scripts};
use crate::error::{ErrorKind, Result};
use crate::{Article, Extractor};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::instrument;

enum Script {
    /// A script on disk, next to its `node_modules`.
    File(PathBuf),
    /// The builtin script, written to a temporary file for the lifetime of
    /// the extractor.
    Builtin(NamedTempFile),
}
impl Script {
    fn path(&self) -> &Path {
        match self {
            Self::File(path) => path,
            Self::Builtin(file) => file.path(),
        }
    }
}

/// Runs `node <script> <url>`, streams the HTML document into its standard
/// input, and parses the article record it prints on standard output.
///
/// The child process is killed if the extraction future is dropped, so a
/// cancelled or timed-out caller never leaves a stray process behind.
pub struct ProcessExtractor {
    node: PathBuf,
    script: Script,
    node_path: Option<PathBuf>,
}

impl ProcessExtractor {
    /// Find node.js on the `PATH` and use the builtin readability script.
    pub fn discover() -> Result<Self> {
        Ok(Self {
            node: discover_node()?,
            script: Script::Builtin(Scripts::materialize(READABILITY_SCRIPT)?),
            node_path: None,
        })
    }

    /// Use a specific node.js executable and the builtin readability script.
    pub fn new(node: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            node: node.into(),
            script: Script::Builtin(Scripts::materialize(READABILITY_SCRIPT)?),
            node_path: None,
        })
    }

    /// Use a script from disk instead of the builtin one.
    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Script::File(script.into());
        self
    }

    /// Directory searched for the script's npm packages (`NODE_PATH`). The
    /// builtin script lives in a temporary directory, so it needs this
    /// unless the packages are installed globally.
    pub fn with_node_path(mut self, node_path: impl Into<PathBuf>) -> Self {
        self.node_path = Some(node_path.into());
        self
    }

    pub fn node(&self) -> &Path {
        &self.node
    }

    pub fn script(&self) -> &Path {
        self.script.path()
    }
}

#[async_trait]
impl Extractor for ProcessExtractor {
    #[instrument(skip(self, html), fields(html_size = html.len()))]
    async fn extract(&self, url: &str, html: &[u8]) -> Result<Article> {
        let mut command = Command::new(&self.node);
        command
            .arg(self.script.path())
            .arg(url)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(node_path) = &self.node_path {
            command.env("NODE_PATH", node_path);
        }
        let mut child = command.spawn().or_raise(|| ErrorKind::Spawn)?;
        let mut stdin = child.stdin.take().ok_or_raise(|| ErrorKind::Io)?;
        // Feed stdin while collecting stdout; doing one after the other
        // deadlocks once either pipe buffer fills up.
        let feed = async move {
            stdin.write_all(html).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.or_raise(|| ErrorKind::Io)?;
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(code, stderr = %stderr.trim(), "Readability process failed");
            exn::bail!(ErrorKind::ProcessFailed(code));
        }
        fed.or_raise(|| ErrorKind::Io)?;
        let article = Article::from_readability_json(&output.stdout)?;
        tracing::debug!(title = %article.title, length = article.length, "Article extracted");
        Ok(article)
    }
}

fn discover_node() -> Result<PathBuf> {
    for exe in ["node", "nodejs"] {
        if let Ok(path) = which::which(exe) {
            return Ok(path);
        }
    }
    tracing::info!("node.js executable not found in PATH");
    exn::bail!(ErrorKind::NodeNotFound);
}
