//! Slug derivation for blog titles.
//!
//! Titles become URL-safe lowercase slugs via the `slug` crate, with Chinese
//! characters transliterated through `pinyin` first so a title like “你好世界”
//! yields `ni-hao-shi-jie`. Uniqueness is the caller's concern: the generator
//! takes an async predicate (typically a repository lookup) and falls back to
//! a numeric counter, then a timestamp suffix, when the base slug is taken.

use std::future::Future;

use pinyin::ToPinyin;
use slug::slugify;
use thiserror::Error;
use time::OffsetDateTime;

const COUNTER_ATTEMPTS: i32 = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("no slug could be derived from `{input}`")]
    Unrepresentable { input: String },
    #[error("could not find a free slug for `{base}`")]
    Exhausted { base: String },
}

/// Errors from [`generate_unique_slug`], which also surfaces predicate
/// failures (for example a repository error during the uniqueness check).
#[derive(Debug, Error)]
pub enum SlugLookupError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Lookup(E),
}

/// Derive the base slug for a title.
pub fn derive_slug(title: &str) -> Result<String, SlugError> {
    if title.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(transliterate(title));
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: title.to_string(),
        });
    }
    Ok(candidate)
}

/// Produce a slug that is free according to `is_taken`.
///
/// Collisions first try `-2` through `-9`, then a unix-timestamp suffix,
/// the disambiguator the platform has always used for same-titled blogs.
pub async fn generate_unique_slug<F, Fut, E>(
    title: &str,
    mut is_taken: F,
) -> Result<String, SlugLookupError<E>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(title)?;

    if !is_taken(base.clone())
        .await
        .map_err(SlugLookupError::Lookup)?
    {
        return Ok(base);
    }

    for attempt in 2..=COUNTER_ATTEMPTS {
        let candidate = format!("{base}-{attempt}");
        if !is_taken(candidate.clone())
            .await
            .map_err(SlugLookupError::Lookup)?
        {
            return Ok(candidate);
        }
    }

    let stamped = format!("{base}-{}", OffsetDateTime::now_utc().unix_timestamp());
    if !is_taken(stamped.clone())
        .await
        .map_err(SlugLookupError::Lookup)?
    {
        return Ok(stamped);
    }

    Err(SlugLookupError::Slug(SlugError::Exhausted { base }))
}

fn transliterate(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }
        match ch.to_pinyin() {
            Some(syllable) => {
                if !output.is_empty() && !output.ends_with(' ') {
                    output.push(' ');
                }
                output.push_str(syllable.plain());
            }
            None if ch.is_whitespace() => output.push(' '),
            // Anything else passes through for slugify to filter.
            None => output.push(ch),
        }
    }
    output
}
