use crate::hash::Hasher32;
use crate::model::config::{Distribution, RolloutVariation};
use crate::model::enums::BucketingStrategy;
use crate::target::Target;
use std::sync::Arc;

const ONE_HUNDRED: u32 = 100;

/// The variation a [`BucketingEngine`] selected for a target.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucketed {
    /// The selected variation.
    pub variation: Arc<RolloutVariation>,
    /// The bucket number of the target in `1..=100`, [`None`] when the bucketing key was missing.
    pub bucket: Option<u32>,
    /// `false` when no weighted tier covered the bucket and the last variation was returned as
    /// a fallback.
    pub enabled: bool,
}

/// Places targets into percentage buckets and selects weighted variations.
///
/// A target's bucket is `(hash(key ++ identifier) mod 100) + 1`, where `key` is either the JSON
/// form of the whole target or a single attribute, depending on the [`BucketingStrategy`]. The
/// same target always lands in the same bucket for the same identifier.
///
/// # Examples
///
/// ```rust
/// use flageval::{BucketingEngine, BucketingStrategy, Murmur3Hasher, Target};
///
/// let engine = BucketingEngine::new(&Murmur3Hasher);
/// let target = Target::new().attr("id", "user-1");
/// let bucket = engine
///     .bucket_of(BucketingStrategy::Attribute("id"), "checkout", &target)
///     .unwrap();
/// assert!((1..=100).contains(&bucket));
/// ```
pub struct BucketingEngine<'a> {
    hasher: &'a dyn Hasher32,
}

impl<'a> BucketingEngine<'a> {
    /// Creates a new [`BucketingEngine`] using the given hash function.
    pub fn new(hasher: &'a dyn Hasher32) -> Self {
        Self { hasher }
    }

    /// Maps a payload to a bucket number in `1..=100`.
    pub fn bucket(&self, payload: &[u8]) -> u32 {
        (self.hasher.hash32(payload) % ONE_HUNDRED) + 1
    }

    /// Returns the bucket number of `target`, or [`None`] when the strategy's bucketing key is
    /// missing from the target.
    pub fn bucket_of(
        &self,
        strategy: BucketingStrategy<'_>,
        identifier: &str,
        target: &Target,
    ) -> Option<u32> {
        let mut payload = match strategy {
            BucketingStrategy::WholeTarget => serde_json::to_vec(target).ok()?,
            BucketingStrategy::Attribute(attr) => target.bucketing_key(attr)?.into_bytes(),
        };
        payload.extend_from_slice(identifier.as_bytes());
        Some(self.bucket(payload.as_slice()))
    }

    /// Walks the variations in order, accumulating their weights, and returns the first one
    /// whose running total reaches the target's bucket. When none does, the last variation is
    /// returned with `enabled` set to `false`. Returns [`None`] only for an empty distribution.
    pub fn select(
        &self,
        distribution: &Distribution,
        identifier: &str,
        target: &Target,
    ) -> Option<Bucketed> {
        let bucket = self.bucket_of(distribution.strategy(), identifier, target);
        let mut total: i64 = 0;
        let mut last = None;
        for variation in distribution.variations.iter() {
            total = total.saturating_add(variation.weight);
            last = Some(variation);
            if let Some(bucket) = bucket {
                if is_enabled(bucket, total) {
                    return Some(Bucketed {
                        variation: Arc::clone(variation),
                        bucket: Some(bucket),
                        enabled: true,
                    });
                }
            }
        }
        last.map(|variation| Bucketed {
            variation: Arc::clone(variation),
            bucket,
            enabled: false,
        })
    }
}

fn is_enabled(bucket: u32, percentage: i64) -> bool {
    percentage > 0 && i64::from(bucket) <= percentage
}
