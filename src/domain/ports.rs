use crate::utils::error::Result;

/// Durable key-value storage for opaque string blobs.
pub trait StateStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn state_key(&self) -> &str;
}
