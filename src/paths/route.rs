// src/paths/route.rs

//! Mapping from an output directory to the URL prefix the App Router serves
//! it under.
//!
//! The normalization rules are the router's own:
//!
//! - `/(dashboard)/user/[id]/page` → `/user/[id]`
//! - `/account/route` → `/account`
//! - `/@modal/login` → `/login`
//! - `/page` → `/`

use crate::errors::{CatalogError, Result};

/// Derive the catalog path (route prefix) from the output path, given
/// relative to the project root with `/` separators.
///
/// A leading `./`, `src/` + `app/` or `app/` prefix is removed before the
/// router normalization runs, and the result is percent-decoded the way
/// `decodeURI` does it.
pub fn catalog_path_for(output_path: &str) -> Result<String> {
    let route = strip_app_dir(output_path);
    let normalized = normalize_app_path(&format!("/{route}"));
    decode_uri(&normalized).map_err(|message| CatalogError::InvalidRoute {
        path: output_path.to_string(),
        message,
    })
}

/// Drop a leading `[./][src/]app/`. Paths without that prefix are kept
/// whole. Output paths arrive normalized without a trailing slash, so a
/// bare `app` is the app directory itself.
fn strip_app_dir(path: &str) -> &str {
    let rest = path.strip_prefix("./").unwrap_or(path);
    let rest = rest.strip_prefix("src/").unwrap_or(rest);
    if let Some(route) = rest.strip_prefix("app/") {
        return route;
    }
    if rest == "app" {
        return "";
    }
    path
}

/// Normalize an app directory route into the request path it serves.
pub fn normalize_app_path(route: &str) -> String {
    let segments: Vec<&str> = route.split('/').collect();
    let last = segments.len().saturating_sub(1);

    let mut pathname = String::new();
    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() || is_group_segment(segment) || segment.starts_with('@') {
            continue;
        }
        if (*segment == "page" || *segment == "route") && index == last {
            continue;
        }
        pathname.push('/');
        pathname.push_str(segment);
    }

    ensure_leading_slash(pathname)
}

pub fn ensure_leading_slash(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

/// `(group)` segments organise routes without affecting the URL.
pub fn is_group_segment(segment: &str) -> bool {
    segment.starts_with('(') && segment.ends_with(')')
}

/// Characters `decodeURI` leaves escaped.
const RESERVED: &[u8] = b";/?:@&=+$,#";

/// Percent-decode like `decodeURI`: multi-byte escapes must form valid UTF-8,
/// and escapes of reserved characters are kept verbatim.
pub fn decode_uri(input: &str) -> std::result::Result<String, String> {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let lead = hex_byte(bytes, i)?;
        if lead < 0x80 {
            if RESERVED.contains(&lead) {
                out.extend_from_slice(&bytes[i..i + 3]);
            } else {
                out.push(lead);
            }
            i += 3;
            continue;
        }

        let width = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(format!("malformed escape sequence at byte {i}")),
        };
        let mut sequence = vec![lead];
        let mut pos = i + 3;
        for _ in 1..width {
            if bytes.get(pos) != Some(&b'%') {
                return Err(format!("truncated escape sequence at byte {i}"));
            }
            let continuation = hex_byte(bytes, pos)?;
            sequence.push(continuation);
            pos += 3;
        }
        let decoded = std::str::from_utf8(&sequence)
            .map_err(|e| format!("invalid UTF-8 in escape sequence at byte {i}: {e}"))?;
        out.extend_from_slice(decoded.as_bytes());
        i = pos;
    }

    String::from_utf8(out).map_err(|e| format!("invalid UTF-8: {e}"))
}

fn hex_byte(bytes: &[u8], at: usize) -> std::result::Result<u8, String> {
    let digits = bytes
        .get(at + 1..at + 3)
        .ok_or_else(|| format!("truncated escape at byte {at}"))?;
    let hi = char::from(digits[0]).to_digit(16);
    let lo = char::from(digits[1]).to_digit(16);
    match (hi, lo) {
        (Some(h), Some(l)) => Ok((h * 16 + l) as u8),
        _ => Err(format!("invalid escape at byte {at}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_segment_is_dropped() {
        assert_eq!(
            catalog_path_for("app/dev/catalog/(group)/").unwrap(),
            "/dev/catalog"
        );
    }

    #[test]
    fn default_output_path_maps_to_dev_catalog() {
        assert_eq!(
            catalog_path_for("src/app/dev/catalog/(nextjs-component-catalog-gen)").unwrap(),
            "/dev/catalog"
        );
        assert_eq!(
            catalog_path_for("./app/dev/catalog/(nextjs-component-catalog-gen)/").unwrap(),
            "/dev/catalog"
        );
    }

    #[test]
    fn app_dir_alone_is_root() {
        assert_eq!(catalog_path_for("app/").unwrap(), "/");
        assert_eq!(catalog_path_for("app").unwrap(), "/");
        assert_eq!(catalog_path_for("src/app/(only)/(groups)").unwrap(), "/");
    }

    #[test]
    fn parallel_segments_are_dropped_anywhere() {
        assert_eq!(catalog_path_for("app/@modal/dev").unwrap(), "/dev");
        assert_eq!(catalog_path_for("app/dev/@slot/catalog").unwrap(), "/dev/catalog");
        assert_eq!(catalog_path_for("app/dev/@slot").unwrap(), "/dev");
    }

    #[test]
    fn prefix_without_app_is_kept_whole() {
        assert_eq!(catalog_path_for("src/catalog").unwrap(), "/src/catalog");
        assert_eq!(catalog_path_for("./catalog").unwrap(), "/./catalog");
        assert_eq!(catalog_path_for("./src/pages/x").unwrap(), "/./src/pages/x");
    }

    #[test]
    fn trailing_leaf_segment_is_dropped_only_at_the_end() {
        assert_eq!(normalize_app_path("/account/page"), "/account");
        assert_eq!(normalize_app_path("/page/account"), "/page/account");
        assert_eq!(normalize_app_path("/route"), "/");
        assert_eq!(normalize_app_path("/"), "/");
    }

    #[test]
    fn percent_escapes_are_decoded() {
        assert_eq!(
            catalog_path_for("app/%E3%82%AB%E3%82%BF%E3%83%AD%E3%82%B0").unwrap(),
            "/カタログ"
        );
        assert_eq!(catalog_path_for("app/a%20b").unwrap(), "/a b");
    }

    #[test]
    fn reserved_escapes_stay_encoded() {
        assert_eq!(decode_uri("/a%2Fb%3F").unwrap(), "/a%2Fb%3F");
    }

    #[test]
    fn malformed_escape_is_an_error() {
        assert!(decode_uri("/a%zz").is_err());
        assert!(decode_uri("/a%E3%82").is_err());
        assert!(matches!(
            catalog_path_for("app/%"),
            Err(CatalogError::InvalidRoute { .. })
        ));
    }
}
