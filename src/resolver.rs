/// Cache-backed founder email resolution
///
/// Algorithm:
/// 1. Look the (name, domain) key up in the cache; a hit is returned as is,
///    an unreadable entry counts as a miss
/// 2. Otherwise ask the provider
/// 3. A provider result with an email is cached and returned
/// 4. On provider failure or an email-less result, fall back to a
///    first-name@domain guess (cached like a real result)
///
/// Email-less results are never cached so the next click asks the provider again.

use crate::domain::guess_domain;
use crate::error::{LookupError, ProviderError};
use crate::lookup::{LookupKey, LookupResult};
use crate::provider::EmailProvider;
use crate::storage::KeyValueStore;
use log::{debug, info, warn};

/// Heuristic first-name@domain address
///
/// Examples:
/// - ("Jane Doe", "https://www.acme.com/") → jane@acme.com
/// - ("  ", "acme.com") → None
pub fn guess_email(person_name: &str, company_domain: &str) -> Option<LookupResult> {
    let local_part = person_name.split_whitespace().next()?.to_lowercase();
    let domain = guess_domain(company_domain)?;

    Some(LookupResult::guessed(format!("{}@{}", local_part, domain)))
}

pub struct Resolver<S, P> {
    cache: S,
    provider: P,
    fallback: bool,
}

impl<S: KeyValueStore, P: EmailProvider> Resolver<S, P> {
    /// Resolver with the heuristic fallback enabled
    pub fn new(cache: S, provider: P) -> Self {
        Resolver {
            cache,
            provider,
            fallback: true,
        }
    }

    /// Surface provider failures instead of guessing
    pub fn without_fallback(mut self) -> Self {
        self.fallback = false;
        self
    }

    pub async fn resolve(
        &self,
        person_name: &str,
        company_domain: &str,
        api_key: &str,
    ) -> Result<LookupResult, LookupError> {
        let key = LookupKey::new(person_name, company_domain);

        match self.cache.get::<LookupResult>(key.as_str()).await {
            Ok(Some(cached)) => {
                debug!("Found cached email for {}: {:?}", key, cached);
                return Ok(cached);
            }
            Ok(None) => {}
            // An entry we cannot read is a miss; the lookup below overwrites it
            Err(e) => warn!("Ignoring unreadable cache entry for {}: {}", key, e),
        }

        info!("No cached email for {}, calling provider", key);
        let remote: Result<LookupResult, ProviderError> =
            match self.provider.search(person_name, company_domain, api_key).await {
                Ok(result) if result.is_cacheable() => {
                    self.store(&key, &result).await?;
                    return Ok(result);
                }
                Ok(result) => Ok(result),
                Err(e) => {
                    warn!("Provider lookup failed for {}: {}", key, e);
                    Err(e)
                }
            };

        if self.fallback {
            if let Some(guess) = guess_email(person_name, company_domain) {
                info!("Falling back to guessed email for {}", key);
                self.store(&key, &guess).await?;
                return Ok(guess);
            }
        }

        Ok(remote?)
    }

    /// Drop every cached lookup
    pub async fn clear_cache(&self) -> Result<(), LookupError> {
        self.cache.clear().await?;
        info!("Email cache cleared");
        Ok(())
    }

    async fn store(&self, key: &LookupKey, result: &LookupResult) -> Result<(), LookupError> {
        self.cache.set(key.as_str(), result).await?;
        debug!("Cached email result for {}: {:?}", key, result);
        Ok(())
    }

    #[cfg(test)]
    pub fn cache(&self) -> &S {
        &self.cache
    }

    #[cfg(test)]
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
