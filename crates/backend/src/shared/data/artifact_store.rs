use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::shared::features::{OrdinalEncoder, PipelineError};
use crate::shared::gbdt::GradientBoostedModel;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact '{path}' not found")]
    NotFound { path: String },

    #[error("failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact '{path}' is invalid: {message}")]
    Invalid { path: String, message: String },
}

fn read_text(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            ArtifactError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })
}

/// Записать JSON атомарно: временный файл + rename
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    };
    let text = serde_json::to_string_pretty(value).map_err(|e| ArtifactError::Invalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, text).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;

    tracing::debug!("Saved artifact {}", path.display());
    Ok(())
}

/// Загрузить модель (обязательный артефакт)
pub fn load_model(path: &Path) -> Result<GradientBoostedModel, ArtifactError> {
    let text = read_text(path)?;
    GradientBoostedModel::from_json(&text).map_err(|e: PipelineError| ArtifactError::Invalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Загрузить энкодер; отсутствие файла = категориальных колонок не было
pub fn load_encoder(path: &Path) -> Result<Option<OrdinalEncoder>, ArtifactError> {
    let text = match read_text(path) {
        Ok(text) => text,
        Err(ArtifactError::NotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    OrdinalEncoder::from_json(&text)
        .map(Some)
        .map_err(|e| ArtifactError::Invalid {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Удалить устаревший энкодер после переобучения без категориальных колонок
pub fn remove_stale(path: &Path) -> Result<bool, ArtifactError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ArtifactError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}
