use std::path::PathBuf;

use anyhow::Context;
use forum_client::{api::Sort, Preferences};

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
struct Stored {
    #[serde(default)]
    sort: Option<Sort>,
}

/// Preferences kept in a JSON file between invocations
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    stored: Stored,
}

impl FilePreferences {
    /// A missing file means nothing was stored yet
    pub fn open(path: PathBuf) -> anyhow::Result<FilePreferences> {
        let stored = match std::fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data)
                .with_context(|| format!("parsing preferences file {path:?}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Stored::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading preferences file {path:?}"))
            }
        };
        Ok(FilePreferences { path, stored })
    }
}

impl Preferences for FilePreferences {
    fn load_sort(&self) -> Option<Sort> {
        self.stored.sort
    }

    fn store_sort(&mut self, sort: Sort) -> anyhow::Result<()> {
        self.stored.sort = Some(sort);
        let data = serde_json::to_vec_pretty(&self.stored).context("serializing preferences")?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("writing preferences file {:?}", self.path))
    }
}
