use crate::error::ValidationError;

/// Hard ceiling on what is sent in one request, below the default `max_file_size`.
pub const MAX_REMOTE_CONTENT_BYTES: usize = 256 * 1024;

/// Non-printable share (in percent) above which content is treated as non-text.
/// Exactly this share still passes, so 95% printable content is accepted.
const MAX_NON_PRINTABLE_PERCENT: usize = 5;

/// Check that content is worth sending to the model.
pub fn validate(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    if content.len() > MAX_REMOTE_CONTENT_BYTES {
        return Err(ValidationError::TooLarge {
            size: content.len(),
            limit: MAX_REMOTE_CONTENT_BYTES,
        });
    }

    if content.contains('\0') {
        return Err(ValidationError::Binary);
    }

    let mut total = 0usize;
    let mut non_printable = 0usize;
    for c in content.chars() {
        total += 1;
        if !is_printable(c) {
            non_printable += 1;
        }
    }

    if non_printable * 100 > total * MAX_NON_PRINTABLE_PERCENT {
        return Err(ValidationError::NonText);
    }

    Ok(())
}

fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~' | '\t' | '\n' | '\r')
}
