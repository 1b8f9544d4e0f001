// ai
//! 📂 Previously, on "Things That Could Go Wrong With A Directory"...
//!
//! The disk was quiet. Too quiet. A lone process had been tasked with writing
//! a few hundred JSON files, a manifest, and a zip. Simple, they said.
//!
//! The directory didn't exist. The disk was full. `zip` wasn't installed on the
//! build box. And somewhere a ticket key had a slash in it.
//!
//! 🚰 FileBundle → `{issueKey}.json` → manifest row → ... → `.danswer_metadata.json` → zip
//!
//! ## Knowledge Graph 🧠
//! - `send`: write ONE record file, then (and only then) remember its manifest row.
//!   A failed write leaves no row behind, so the manifest never points at a ghost.
//! - `close`: write the manifest, then run `zip -r <output>/<zip_name> .` inside the
//!   output dir. A zip failure is logged and swallowed; the files are already on disk.
//! - `File::create` truncates. Re-running into the same directory overwrites. No warning.
//! 🦆 (mandatory, no notes)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt, process::Command};
use tracing::{error, info, trace};

use crate::backends::Sink;
use crate::common::{FileBundle, ManifestEntry};

/// 🏷️ The file Danswer's file connector looks for inside the zip.
pub(crate) const MANIFEST_FILE_NAME: &str = ".danswer_metadata.json";

/// 🗂️ FileSink -- one directory, many tickets, one manifest, one zip.
#[derive(Debug)]
pub(crate) struct FileSink {
    output_dir: PathBuf,
    zip_folder_name: String,
    manifest: Vec<ManifestEntry>,
}

impl FileSink {
    /// 🚀 Make sure the output directory exists. Parents too. No questions asked.
    pub(crate) async fn new(
        output_dir: impl Into<PathBuf>,
        zip_folder_name: impl Into<String>,
    ) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).await.context(format!(
            "💀 The output directory '{}' could not be conjured into existence. \
             We stared at the path. The path stared back.",
            output_dir.display()
        ))?;
        Ok(Self {
            output_dir,
            zip_folder_name: zip_folder_name.into(),
            manifest: Vec::new(),
        })
    }

    pub(crate) fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE_NAME)
    }

    pub(crate) fn archive_path(&self) -> PathBuf {
        self.output_dir.join(&self.zip_folder_name)
    }

    async fn write_json(path: &Path, bytes: &[u8]) -> Result<()> {
        let mut the_file = fs::File::create(path)
            .await
            .context(format!("💀 '{}' refused to be created.", path.display()))?;
        the_file.write_all(bytes).await.context(format!(
            "💀 '{}' was created and then refused the bytes. Disk full? Disk haunted?",
            path.display()
        ))?;
        the_file
            .flush()
            .await
            .context(format!("💀 '{}' would not flush. The bytes are still in memory.", path.display()))
    }

    /// 📦 `zip -r <archive> .` from inside the output directory. Failure is logged, never raised.
    async fn archive(&self) {
        let the_archive = self.archive_path();
        let the_outcome = Command::new("zip")
            .arg("-r")
            .arg(&the_archive)
            .arg(".")
            .current_dir(&self.output_dir)
            .output()
            .await;
        match the_outcome {
            Ok(the_output) if the_output.status.success() => {
                info!("📦 Created zip file at {}", the_archive.display());
            }
            Ok(the_output) => {
                error!(
                    "💀 Error zipping files: zip exited with {}: {}",
                    the_output.status,
                    String::from_utf8_lossy(&the_output.stderr).trim()
                );
            }
            Err(the_error) => {
                error!("💀 Error zipping files: could not run zip: {:?}", the_error);
            }
        }
    }
}

#[async_trait]
impl Sink for FileSink {
    type Payload = FileBundle;
    type Receipt = PathBuf;

    async fn send(&mut self, bundle: FileBundle) -> Result<PathBuf> {
        let the_path = self.output_dir.join(&bundle.file_name);
        let the_bytes = serde_json::to_vec(&bundle.record)
            .context(format!("💀 '{}' could not be rendered as JSON.", bundle.file_name))?;
        trace!(
            "📬 {} bytes walked into the file sink, headed for {}",
            the_bytes.len(),
            the_path.display()
        );
        Self::write_json(&the_path, &the_bytes).await?;

        // -- ✅ on disk. NOW it gets a manifest row.
        self.manifest.push(bundle.manifest_entry);
        Ok(the_path)
    }

    async fn close(&mut self) -> Result<()> {
        let the_manifest_path = self.manifest_path();
        let the_bytes = serde_json::to_vec(&self.manifest)
            .context("💀 The manifest could not be rendered as JSON. It had one job.")?;
        Self::write_json(&the_manifest_path, &the_bytes).await?;
        info!(
            "🗂️ Saved metadata file {} ({} records)",
            the_manifest_path.display(),
            self.manifest.len()
        );

        self.archive().await;
        Ok(())
    }
}
