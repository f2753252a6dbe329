use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

use crate::config::KnowledgeConfig;
use crate::error::KnowledgeBaseError;
use crate::knowledge::types::{CourseCatalog, DegreeProgram, KnowledgeBase};

/// Load degree requirements and the course catalog.
/// Either file being missing or malformed aborts the load.
pub fn load_knowledge_base(
    config: &KnowledgeConfig,
    base_dir: &Path,
) -> Result<KnowledgeBase, KnowledgeBaseError> {
    let degrees_path = config.degrees_path(base_dir);
    let degrees: DegreeProgram = read_json(&degrees_path)?;
    let catalog: CourseCatalog = read_json(&config.courses_path(base_dir))?;

    info!(
        directory = %degrees_path.parent().unwrap_or(base_dir).display(),
        program = %degrees.program,
        courses = catalog.courses.len(),
        "Knowledge files loaded"
    );

    Ok(KnowledgeBase { degrees, catalog })
}

/// Read and parse a single JSON knowledge file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, KnowledgeBaseError> {
    debug!(path = %path.display(), "Reading knowledge file");

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            KnowledgeBaseError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            KnowledgeBaseError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    serde_json::from_str(&content).map_err(|e| KnowledgeBaseError::InvalidJson {
        path: path.to_path_buf(),
        line: e.line(),
        column: e.column(),
        detail: e.to_string(),
    })
}
