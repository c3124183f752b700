use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

use crate::utils::error::{AppError, Result};

/// Cache mémoire à durée de vie fixe
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Valeur encore fraîche, `None` si absente ou expirée
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, (Instant::now(), value));
        }
    }

    pub fn invalidate(&self, key: &K) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

/// Cache du catalogue public, en mémoire ou partagé via Redis
#[derive(Clone)]
pub enum ListingCache {
    Memory(Arc<TtlCache<String, String>>),
    Redis {
        client: Arc<Client>,
        prefix: String,
        ttl: Duration,
    },
}

impl ListingCache {
    pub fn memory(ttl: Duration) -> Self {
        ListingCache::Memory(Arc::new(TtlCache::new(ttl)))
    }

    /// Créer un cache Redis après un PING de contrôle
    pub async fn redis(redis_url: &str, ttl: Duration) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let mut conn = client.get_async_connection().await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        info!("✅ Cache Redis connecté");

        Ok(ListingCache::Redis {
            client: Arc::new(client),
            prefix: "pa2r:".to_string(),
            ttl,
        })
    }

    /// Récupérer une valeur
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = match self {
            ListingCache::Memory(cache) => cache.get(&key.to_string()),
            ListingCache::Redis { client, prefix, .. } => {
                let mut conn = client.get_async_connection().await?;
                let value: Option<String> = conn.get(format!("{}{}", prefix, key)).await?;
                value
            }
        };

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| AppError::ParseError(e.to_string()))
        })
        .transpose()
    }

    /// Stocker une valeur avec le TTL du cache
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let serialized =
            serde_json::to_string(value).map_err(|e| AppError::SerializeError(e.to_string()))?;

        match self {
            ListingCache::Memory(cache) => cache.insert(key.to_string(), serialized),
            ListingCache::Redis { client, prefix, ttl } => {
                let mut conn = client.get_async_connection().await?;
                let _: () = conn
                    .set_ex(format!("{}{}", prefix, key), serialized, ttl.as_secs() as usize)
                    .await?;
            }
        }
        Ok(())
    }

    /// Supprimer une clé
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        match self {
            ListingCache::Memory(cache) => cache.invalidate(&key.to_string()),
            ListingCache::Redis { client, prefix, .. } => {
                let mut conn = client.get_async_connection().await?;
                let _: i64 = conn.del(format!("{}{}", prefix, key)).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_cache_expiry() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert("k", 1);
        assert_eq!(cache.get(&"k"), Some(1));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&"k"), None);
    }

    #[test]
    fn test_ttl_cache_invalidate() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", "x".to_string());
        cache.insert("b", "y".to_string());
        cache.invalidate(&"a");
        assert_eq!(cache.get(&"a"), None);
        cache.clear();
        assert_eq!(cache.get(&"b"), None);
    }

    #[tokio::test]
    async fn test_memory_listing_cache_roundtrip() {
        let cache = ListingCache::memory(Duration::from_secs(60));
        cache.set("catalog", &vec![1, 2, 3]).await.unwrap();
        let hit: Option<Vec<i32>> = cache.get("catalog").await.unwrap();
        assert_eq!(hit, Some(vec![1, 2, 3]));

        cache.invalidate("catalog").await.unwrap();
        let miss: Option<Vec<i32>> = cache.get("catalog").await.unwrap();
        assert_eq!(miss, None);
    }
}
