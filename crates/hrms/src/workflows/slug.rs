use super::repository::RepositoryError;

/// Lowercase ASCII slug with single dashes between words.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Append `-1`, `-2`, ... until `exists` reports the slug free.
pub fn unique_slug<F>(raw: &str, exists: F) -> Result<String, RepositoryError>
where
    F: Fn(&str) -> Result<bool, RepositoryError>,
{
    let base = slugify(raw);
    if !exists(&base)? {
        return Ok(base);
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base}-{counter}");
        if !exists(&candidate)? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Asha K  -2025-06-02-1"), "asha-k-2025-06-02-1");
        assert_eq!(slugify("  Pune / Mumbai "), "pune-mumbai");
    }

    #[test]
    fn unique_slug_appends_counter() {
        let taken = ["asha-2025-06-02", "asha-2025-06-02-1"];
        let slug = unique_slug("asha 2025-06-02", |candidate| Ok(taken.contains(&candidate)))
            .expect("slug generated");
        assert_eq!(slug, "asha-2025-06-02-2");
    }
}
