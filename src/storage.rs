//! 键值存储适配层
//!
//! 浏览器里是 `localStorage`，测试里是内存 Map。所有键统一加前缀，
//! 字符串原样存储，其他值 JSON 编码。

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::Mutex;

/// 底层键值存储
///
/// 与 `localStorage` 一致：写入/删除失败返回 `false`，读取失败返回 `None`。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
    fn keys(&self) -> Vec<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode `{key}`: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 带前缀的存储
pub struct Storage<S> {
    backend: S,
    prefix: String,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(backend: S, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// 读取原始字符串（不做 JSON 解析）
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.backend.get(&self.prefixed(key))
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_string(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Decode {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    pub fn set_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.backend.set(&self.prefixed(key), value) {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set_string(key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.backend.remove(&self.prefixed(key)) {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }

    /// 删除所有带本应用前缀的键，其他应用的数据不受影响
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut ok = true;
        for key in self.backend.keys() {
            if key.starts_with(&self.prefix) {
                ok &= self.backend.remove(&key);
            }
        }
        if ok { Ok(()) } else { Err(StorageError::Unavailable) }
    }
}

// =========================================================
// 内存实现 (MemoryStore)
// =========================================================

/// 内存键值存储，`localStorage` 不可用时的替代品
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries().insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.entries().remove(key);
        true
    }

    fn keys(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> bool {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> bool {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn values_are_prefixed_and_strings_kept_raw() {
        let backend = Arc::new(MemoryStore::new());
        let storage = Storage::new(backend.clone(), "campusconnect_");

        storage.set_string("token", "abc").unwrap();
        storage.set_json("user", &vec![1, 2]).unwrap();

        assert_eq!(backend.get("campusconnect_token").as_deref(), Some("abc"));
        assert_eq!(backend.get("campusconnect_user").as_deref(), Some("[1,2]"));
        assert_eq!(storage.get_json::<Vec<u8>>("user").unwrap(), Some(vec![1, 2]));
        assert!(storage.get_json::<Vec<u8>>("token").is_err());
        assert_eq!(storage.get_json::<u8>("missing").unwrap(), None);
    }

    #[test]
    fn clear_only_touches_own_prefix() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("other_app", "keep");
        let storage = Storage::new(backend.clone(), "campusconnect_");
        storage.set_string("token", "abc").unwrap();

        storage.clear().unwrap();

        assert_eq!(backend.keys(), vec!["other_app".to_string()]);
    }
}
