use chrono::{DateTime, Utc};

use crate::item::ItemId;

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\', '/'];

/// Replace characters rejected by common filesystems with `_`.
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split `name` into stem and extension (without the dot). A leading dot
/// does not start an extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => (&name[..pos], Some(&name[pos + 1..])),
        _ => (name, None),
    }
}

/// Destination filename for a downloaded attachment:
/// `{stem}__{item_id}__{email}__{group}.{ext}`.
///
/// `now` only stamps the stem of attachments that have no name.
pub fn attachment_file_name(
    original_name: &str,
    file_extension: Option<&str>,
    item_id: ItemId,
    email: &str,
    group_name: &str,
    now: DateTime<Utc>,
) -> String {
    let mut name = original_name.trim().to_string();
    if name.is_empty() {
        name = format!("attachment_{}", now.timestamp_millis());
    }
    if split_extension(&name).1.is_none() {
        if let Some(ext) = file_extension
            .map(|e| e.trim().trim_start_matches('.'))
            .filter(|e| !e.is_empty())
        {
            name = format!("{name}.{ext}");
        }
    }

    let name = sanitize_component(&name);
    let (stem, ext) = split_extension(&name);
    let email = non_empty_or(sanitize_component(email), "noemail");
    let group = non_empty_or(sanitize_component(group_name), "nogroup");

    match ext {
        Some(ext) => format!("{stem}__{item_id}__{email}__{group}.{ext}"),
        None => format!("{stem}__{item_id}__{email}__{group}"),
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn canonical_example() {
        assert_eq!(
            attachment_file_name("a.pdf", None, 123, "e@x.com", "G1", now()),
            "a__123__e@x.com__G1.pdf"
        );
    }

    #[test]
    fn extension_from_api_when_name_has_none() {
        assert_eq!(
            attachment_file_name("invoice", Some(".PDF"), 5, "e@x.com", "G1", now()),
            "invoice__5__e@x.com__G1.PDF"
        );
        assert_eq!(
            attachment_file_name("invoice", Some("xlsx"), 5, "e@x.com", "G1", now()),
            "invoice__5__e@x.com__G1.xlsx"
        );
    }

    #[test]
    fn no_extension_at_all() {
        assert_eq!(
            attachment_file_name("README", None, 5, "e@x.com", "G1", now()),
            "README__5__e@x.com__G1"
        );
    }

    #[test]
    fn group_with_slashes_and_braces_is_sanitized() {
        assert_eq!(
            attachment_file_name("bol.pdf", None, 77, "ops@acme.ca", "NPOP (LA3)/{SOBEYSMIF}", now()),
            "bol__77__ops@acme.ca__NPOP (LA3)_{SOBEYSMIF}.pdf"
        );
        assert_eq!(
            attachment_file_name("a?b*.pdf", None, 1, "x", "Load Tender: \"A|B\"", now()),
            "a_b___1__x__Load Tender_ _A_B_.pdf"
        );
    }

    #[test]
    fn empty_email_and_group_get_placeholders() {
        assert_eq!(
            attachment_file_name("a.pdf", None, 9, "", "  ", now()),
            "a__9__noemail__nogroup.pdf"
        );
    }

    #[test]
    fn empty_name_gets_generated_stem() {
        let name = attachment_file_name("", Some("png"), 9, "e", "g", now());
        assert_eq!(
            name,
            format!("attachment_{}__9__e__g.png", now().timestamp_millis())
        );
    }

    #[test]
    fn multi_dot_names_keep_inner_dots() {
        assert_eq!(
            attachment_file_name("scan.2026.10.tar.gz", None, 3, "e", "g", now()),
            "scan.2026.10.tar__3__e__g.gz"
        );
    }

    #[test]
    fn leading_dot_is_not_an_extension() {
        assert_eq!(split_extension(".env"), (".env", None));
        assert_eq!(split_extension("trailing."), ("trailing.", None));
    }
}
