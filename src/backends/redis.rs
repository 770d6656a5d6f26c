//! Redis metadata backend.
//!
//! Each source image owns one hash at `{prefix}:{source_name}` whose fields
//! are size names and whose values are thumbnail storage names. Batched
//! lookups pipeline one `HMGET`/`HGETALL` per source into a single round-trip.

use std::collections::HashMap;
use std::time::Duration;

use ::redis::{Client, RedisError};
use r2d2::Pool;
use thumbforge_common::{Error, Result, ThumbnailMeta};

use super::{BatchMetadataBackend, MetadataBackend, SourceEntries};

pub const DEFAULT_KEY_PREFIX: &str = "thumbforge-meta";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RedisBackend {
    pool: Pool<Client>,
    prefix: String,
}

impl RedisBackend {
    /// Connect to the server at `url` (e.g. `redis://127.0.0.1/0`).
    pub fn connect(url: &str, prefix: impl Into<String>) -> Result<Self> {
        let client = Client::open(url).map_err(redis_error)?;
        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(CONNECT_TIMEOUT)
            .build(client)
            .map_err(|e| Error::database(format!("Failed to create Redis pool: {}", e)))?;

        Ok(Self {
            pool,
            prefix: prefix.into(),
        })
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<Client>> {
        self.pool
            .get()
            .map_err(|e| Error::database(format!("Failed to get Redis connection: {}", e)))
    }

    fn key(&self, source_name: &str) -> String {
        thumbnail_key(&self.prefix, source_name)
    }
}

/// Hash key holding every thumbnail of one source.
pub fn thumbnail_key(prefix: &str, source_name: &str) -> String {
    format!("{}:{}", prefix, source_name)
}

fn redis_error(e: RedisError) -> Error {
    Error::database(format!("Redis error: {}", e))
}

impl MetadataBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn get(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
        let mut conn = self.conn()?;
        let name: Option<String> = ::redis::cmd("HGET")
            .arg(self.key(source_name))
            .arg(size)
            .query(&mut *conn)
            .map_err(redis_error)?;

        Ok(name.map(|name| ThumbnailMeta::new(source_name, name, size)))
    }

    fn get_all(&self, source_name: &str) -> Result<Vec<ThumbnailMeta>> {
        let mut conn = self.conn()?;
        let fields: HashMap<String, String> = ::redis::cmd("HGETALL")
            .arg(self.key(source_name))
            .query(&mut *conn)
            .map_err(redis_error)?;

        let mut metas: Vec<_> = fields
            .into_iter()
            .map(|(size, name)| ThumbnailMeta::new(source_name, name, size))
            .collect();
        metas.sort_by(|a, b| a.size.cmp(&b.size));
        Ok(metas)
    }

    fn save(&self, meta: &ThumbnailMeta) -> Result<Option<ThumbnailMeta>> {
        let mut conn = self.conn()?;
        let key = self.key(&meta.source_name);

        let (prior,): (Option<String>,) = ::redis::pipe()
            .atomic()
            .cmd("HGET")
            .arg(&key)
            .arg(&meta.size)
            .cmd("HSET")
            .arg(&key)
            .arg(&meta.size)
            .arg(&meta.thumbnail_name)
            .ignore()
            .query(&mut *conn)
            .map_err(redis_error)?;

        Ok(prior.map(|name| ThumbnailMeta::new(&meta.source_name, name, &meta.size)))
    }

    fn delete(&self, source_name: &str, size: &str) -> Result<Option<ThumbnailMeta>> {
        let mut conn = self.conn()?;
        let key = self.key(source_name);

        let (prior,): (Option<String>,) = ::redis::pipe()
            .atomic()
            .cmd("HGET")
            .arg(&key)
            .arg(size)
            .cmd("HDEL")
            .arg(&key)
            .arg(size)
            .ignore()
            .query(&mut *conn)
            .map_err(redis_error)?;

        Ok(prior.map(|name| ThumbnailMeta::new(source_name, name, size)))
    }

    fn as_batch(&self) -> Option<&dyn BatchMetadataBackend> {
        Some(self)
    }
}

impl BatchMetadataBackend for RedisBackend {
    fn batch_get(&self, source_names: &[&str], sizes: Option<&[String]>) -> Result<Vec<SourceEntries>> {
        if source_names.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let mut pipe = ::redis::pipe();

        match sizes.filter(|sizes| !sizes.is_empty()) {
            Some(sizes) => {
                for source in source_names {
                    pipe.cmd("HMGET").arg(self.key(source)).arg(sizes);
                }
                let results: Vec<Vec<Option<String>>> =
                    pipe.query(&mut *conn).map_err(redis_error)?;

                Ok(source_names
                    .iter()
                    .zip(results)
                    .map(|(source, names)| {
                        sizes
                            .iter()
                            .zip(names)
                            .map(|(size, name)| {
                                (
                                    size.clone(),
                                    name.map(|name| ThumbnailMeta::new(*source, name, size)),
                                )
                            })
                            .collect()
                    })
                    .collect())
            }
            None => {
                for source in source_names {
                    pipe.cmd("HGETALL").arg(self.key(source));
                }
                let results: Vec<HashMap<String, String>> =
                    pipe.query(&mut *conn).map_err(redis_error)?;

                Ok(source_names
                    .iter()
                    .zip(results)
                    .map(|(source, fields)| {
                        let mut entries: SourceEntries = fields
                            .into_iter()
                            .map(|(size, name)| {
                                let meta = ThumbnailMeta::new(*source, name, &size);
                                (size, Some(meta))
                            })
                            .collect();
                        entries.sort_by(|a, b| a.0.cmp(&b.0));
                        entries
                    })
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_key() {
        assert_eq!(
            thumbnail_key(DEFAULT_KEY_PREFIX, "avatars/photo.png"),
            "thumbforge-meta:avatars/photo.png"
        );
        assert_eq!(thumbnail_key("custom", "a.png"), "custom:a.png");
    }

    /// Backend on the server named by `THUMBFORGE_TEST_REDIS_URL`, under a
    /// prefix unique to this run.
    fn live_backend() -> Option<RedisBackend> {
        let url = match std::env::var("THUMBFORGE_TEST_REDIS_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("THUMBFORGE_TEST_REDIS_URL not set - skipping Redis test");
                return None;
            }
        };
        let prefix = format!("thumbforge-test-{}", uuid::Uuid::new_v4().simple());
        Some(RedisBackend::connect(&url, prefix).unwrap())
    }

    fn cleanup(backend: &RedisBackend, sources: &[&str]) {
        let mut conn = backend.conn().unwrap();
        for source in sources {
            let _: () = ::redis::cmd("DEL")
                .arg(backend.key(source))
                .query(&mut *conn)
                .unwrap();
        }
    }

    #[test]
    fn test_batch_get_decodes_pipeline_results() {
        let Some(backend) = live_backend() else {
            return;
        };

        backend
            .save(&ThumbnailMeta::new("a.png", "thumbs/a_small.png", "small"))
            .unwrap();
        backend
            .save(&ThumbnailMeta::new("a.png", "thumbs/a_large.png", "large"))
            .unwrap();
        backend
            .save(&ThumbnailMeta::new("c.png", "thumbs/c_small.png", "small"))
            .unwrap();

        let sources = ["a.png", "b.png", "c.png"];
        let sizes = vec!["small".to_string(), "large".to_string()];

        let requested = backend.batch_get(&sources, Some(&sizes)).unwrap();
        assert_eq!(requested.len(), 3);
        assert_eq!(requested[0][0].1.as_ref().unwrap().thumbnail_name, "thumbs/a_small.png");
        assert_eq!(requested[0][1].1.as_ref().unwrap().thumbnail_name, "thumbs/a_large.png");
        assert_eq!(requested[1], vec![("small".to_string(), None), ("large".to_string(), None)]);
        assert_eq!(requested[2][0].1.as_ref().unwrap().source_name, "c.png");
        assert!(requested[2][1].1.is_none());

        let everything = backend.batch_get(&sources, None).unwrap();
        assert_eq!(
            everything[0].iter().map(|(size, _)| size.as_str()).collect::<Vec<_>>(),
            vec!["large", "small"]
        );
        assert!(everything[1].is_empty());
        assert_eq!(everything[2].len(), 1);

        // No sizes behaves like a full lookup instead of an empty HMGET
        let no_sizes: &[String] = &[];
        let empty = backend.batch_get(&sources, Some(no_sizes)).unwrap();
        assert_eq!(empty, everything);

        cleanup(&backend, &sources);
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let result = RedisBackend::connect("not-a-redis-url", DEFAULT_KEY_PREFIX);
        assert!(matches!(result, Err(Error::Database(_))));
    }
}
