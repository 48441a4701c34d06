// Utility functions shared by services and handlers

pub mod url;

use validator::ValidationError;

/// Required text fields: whitespace-only counts as missing.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Mask sensitive data like phone numbers
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() < 7 {
        return phone.to_string();
    }

    let visible_start = 3;
    let visible_end = 4;
    let masked_len = chars.len() - visible_start - visible_end;

    format!(
        "{}{}{}",
        chars[..visible_start].iter().collect::<String>(),
        "*".repeat(masked_len),
        chars[chars.len() - visible_end..].iter().collect::<String>()
    )
}

/// Mask email address
pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let local = &email[..at_pos];
        let domain = &email[at_pos..];

        if local.chars().count() <= 2 {
            return email.to_string();
        }

        let prefix: String = local.chars().take(2).collect();
        format!("{}***{}", prefix, domain)
    } else {
        email.to_string()
    }
}

/// Truncate text on a char boundary, appending an ellipsis when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_text_is_blank() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank("\t\n").is_err());
        assert!(not_blank("").is_err());
        assert!(not_blank("  fake parcel fee ").is_ok());
    }

    #[test]
    fn masks_phone_keeping_prefix_and_suffix() {
        assert_eq!(mask_phone("0912345678"), "091***5678");
        assert_eq!(mask_phone("12345"), "12345");
    }

    #[test]
    fn masks_email_local_part() {
        assert_eq!(mask_email("volunteer@example.org"), "vo***@example.org");
        assert_eq!(mask_email("ab@example.org"), "ab@example.org");
        assert_eq!(mask_email("not-an-email"), "not-an-email");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("詐欺に注意してください", 4), "詐欺に注...");
        assert_eq!(preview("scam alert today", 11), "scam alert...");
    }
}
