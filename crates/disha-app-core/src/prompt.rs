//! Base system prompt.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::CoreError;

/// Read the base system prompt once; the result is shared by every request.
pub async fn load_system_prompt(path: impl AsRef<Path>) -> Result<Arc<str>, CoreError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CoreError::Prompt {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), bytes = text.len(), "system prompt loaded");
    Ok(Arc::from(text))
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn loads_prompt_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system.txt");
        std::fs::write(&path, "You are Disha.\nBe kind.\n").unwrap();

        let prompt = load_system_prompt(&path).await.unwrap();
        assert_eq!(&*prompt, "You are Disha.\nBe kind.\n");
    }

    #[tokio::test]
    async fn missing_prompt_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");

        let err = load_system_prompt(&path).await.unwrap_err();
        assert!(matches!(err, CoreError::Prompt { .. }));
        assert!(err.to_string().contains("absent.txt"));
    }
}
