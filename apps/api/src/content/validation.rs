use unicode_normalization::UnicodeNormalization;

use crate::content::models::{ContentDto, ContentFields, ContentStatus};
use crate::errors::{AppError, AppResult, FieldErrors};

const MAX_SLUG_LEN: usize = 128;

/// Converts text into a URL-safe slug: lowercase ASCII alphanumerics separated by single hyphens.
///
/// Accented letters keep their base letter (`é` becomes `e`); other characters separate words.
pub fn generate_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    for c in stripped.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// A slug is canonical when generating a slug from it changes nothing.
pub fn is_canonical_slug(slug: &str) -> bool {
    !slug.is_empty() && generate_slug(slug) == slug
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<String>,
) -> String {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        errors.add(field, format!("{label} is required"));
    }
    value
}

fn clean_list(values: Option<Vec<String>>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for value in values.unwrap_or_default() {
        let value = value.trim();
        if !value.is_empty() && !cleaned.iter().any(|v| v == value) {
            cleaned.push(value.to_string());
        }
    }
    cleaned
}

/// Validates a create/update body, collecting every problem before failing.
pub fn validate_content(dto: ContentDto) -> AppResult<ContentFields> {
    let mut errors = FieldErrors::new();

    let title = required_text(&mut errors, "title", "Title", dto.title);
    let content_type = required_text(&mut errors, "contentType", "Content type", dto.content_type);
    let language = required_text(&mut errors, "language", "Language", dto.language);

    let slug = required_text(&mut errors, "slug", "Slug", dto.slug);
    if !slug.is_empty() {
        if !is_canonical_slug(&slug) {
            errors.add(
                "slug",
                format!(
                    "Slug may only use lowercase letters, digits and single hyphens (e.g. '{}')",
                    generate_slug(&slug)
                ),
            );
        }
        if slug.len() > MAX_SLUG_LEN {
            errors.add("slug", format!("Slug must be at most {MAX_SLUG_LEN} characters"));
        }
    }

    let tags = clean_list(dto.tags);
    if tags.is_empty() {
        errors.add("tags", "At least one tag is required");
    }

    let status = match dto.status.as_deref().map(str::trim) {
        None | Some("") => {
            errors.add("status", "Status is required");
            None
        }
        Some(raw) => match raw.parse::<ContentStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", "Status must be one of Draft, Published, Archived");
                None
            }
        },
    };

    let cover_image_url = dto
        .cover_image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());

    let status = match (status, errors.is_empty()) {
        (Some(status), true) => status,
        _ => return Err(AppError::Validation(errors)),
    };

    Ok(ContentFields {
        content_type,
        title,
        slug,
        body: dto.body.unwrap_or_default(),
        tags,
        status,
        language,
        cover_image_url,
        meta_title: dto.meta_title.unwrap_or_default().trim().to_string(),
        meta_description: dto.meta_description.unwrap_or_default().trim().to_string(),
        meta_keywords: clean_list(dto.meta_keywords),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> ContentDto {
        ContentDto {
            content_type: Some("blog".to_string()),
            title: Some("Hello".to_string()),
            slug: Some("hello".to_string()),
            body: Some("<p>Hi</p>".to_string()),
            tags: Some(vec!["news".to_string()]),
            status: Some("Draft".to_string()),
            language: Some("en".to_string()),
            ..ContentDto::default()
        }
    }

    fn field_errors(dto: ContentDto) -> FieldErrors {
        match validate_content(dto) {
            Err(AppError::Validation(fields)) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
        assert_eq!(generate_slug("What's New?"), "what-s-new");
        assert_eq!(generate_slug("  --Item #42: The Answer--  "), "item-42-the-answer");
        assert_eq!(generate_slug("a---b"), "a-b");
        assert_eq!(generate_slug("---"), "");
    }

    #[test]
    fn test_generate_slug_strips_diacritics() {
        assert_eq!(generate_slug("Café Crème Brûlée"), "cafe-creme-brulee");
        assert_eq!(generate_slug("Über Straße"), "uber-stra-e");
        assert_eq!(generate_slug("Ça va? Señor"), "ca-va-senor");
    }

    #[test]
    fn test_accented_slug_hint_keeps_base_letters() {
        let dto = ContentDto {
            slug: Some("Crème Brûlée".to_string()),
            ..valid_dto()
        };
        let errors = field_errors(dto);
        assert!(errors.messages("slug")[0].contains("'creme-brulee'"));
    }

    #[test]
    fn test_canonical_slug() {
        assert!(is_canonical_slug("hello-world-2"));
        assert!(!is_canonical_slug("Hello-World"));
        assert!(!is_canonical_slug("hello--world"));
        assert!(!is_canonical_slug("-hello"));
        assert!(!is_canonical_slug(""));
    }

    #[test]
    fn test_valid_dto_passes() {
        let fields = validate_content(valid_dto()).unwrap();
        assert_eq!(fields.title, "Hello");
        assert_eq!(fields.status, ContentStatus::Draft);
        assert!(fields.cover_image_url.is_none());
    }

    #[test]
    fn test_every_missing_required_field_is_reported() {
        let errors = field_errors(ContentDto::default());
        for field in ["title", "slug", "contentType", "tags", "language", "status"] {
            assert!(errors.contains(field), "missing message for {field}");
        }
        assert!(!errors.contains("body"));
    }

    #[test]
    fn test_blank_strings_count_as_missing() {
        let dto = ContentDto {
            title: Some("   ".to_string()),
            tags: Some(vec![" ".to_string()]),
            ..valid_dto()
        };
        let errors = field_errors(dto);
        assert!(errors.contains("title"));
        assert!(errors.contains("tags"));
    }

    #[test]
    fn test_malformed_slug_suggests_canonical_form() {
        let dto = ContentDto {
            slug: Some("Hello World".to_string()),
            ..valid_dto()
        };
        let errors = field_errors(dto);
        assert!(errors.messages("slug")[0].contains("hello-world"));
    }

    #[test]
    fn test_status_is_parsed_case_insensitively() {
        let dto = ContentDto {
            status: Some(" published ".to_string()),
            ..valid_dto()
        };
        assert_eq!(validate_content(dto).unwrap().status, ContentStatus::Published);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let dto = ContentDto {
            status: Some("Deleted".to_string()),
            ..valid_dto()
        };
        assert!(field_errors(dto).contains("status"));
    }

    #[test]
    fn test_lists_are_trimmed_and_deduplicated() {
        let dto = ContentDto {
            tags: Some(vec![" news ".to_string(), "news".to_string(), "tech".to_string()]),
            meta_keywords: Some(vec!["".to_string(), "cms".to_string()]),
            ..valid_dto()
        };
        let fields = validate_content(dto).unwrap();
        assert_eq!(fields.tags, vec!["news", "tech"]);
        assert_eq!(fields.meta_keywords, vec!["cms"]);
    }
}
