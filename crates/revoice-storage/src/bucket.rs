use crate::error::PublishError;

/// Check a bucket name against the S3 naming rules
///
/// 3-63 characters of lowercase letters, digits, dots and hyphens, starting
/// and ending with a letter or digit, with no consecutive dots.
pub fn validate_bucket_name(name: &str) -> Result<(), PublishError> {
    let invalid = |reason| PublishError::InvalidBucket {
        name: name.to_owned(),
        reason,
    };

    if !(3..=63).contains(&name.len()) {
        return Err(invalid("must be between 3 and 63 characters"));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
    {
        return Err(invalid("only lowercase letters, digits, '.' and '-' are allowed"));
    }

    let alnum = |b: Option<&u8>| b.is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    if !alnum(name.as_bytes().first()) || !alnum(name.as_bytes().last()) {
        return Err(invalid("must start and end with a letter or digit"));
    }

    if name.contains("..") {
        return Err(invalid("must not contain consecutive dots"));
    }

    Ok(())
}
