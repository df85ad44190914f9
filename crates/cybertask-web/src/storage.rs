use cybertask_core::{StorageBackend, StorageError};

/// `window.localStorage`, the browser's durable key-value store.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageBackend;

fn local_storage() -> Result<web_sys::Storage, StorageError> {
  web_sys::window()
    .and_then(|window| {
      window
        .local_storage()
        .ok()
        .flatten()
    })
    .ok_or_else(|| {
      StorageError::Backend(
        "local storage is unavailable"
          .to_string()
      )
    })
}

impl StorageBackend for LocalStorageBackend {
  fn get(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError> {
    local_storage()?
      .get_item(key)
      .map_err(|error| {
        StorageError::Backend(format!(
          "failed reading {key}: \
           {error:?}"
        ))
      })
  }

  fn set(
    &self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    local_storage()?
      .set_item(key, value)
      .map_err(|error| {
        StorageError::Backend(format!(
          "failed writing {key}: \
           {error:?}"
        ))
      })
  }
}
