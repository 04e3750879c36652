//! Decides whether a URL names an installable distribution of a package.
//!
//! Follows the packaging ecosystem's URL-to-distribution naming convention:
//! a URL may carry a wheel, an egg, a source archive, or an `#egg=` fragment,
//! and a single filename can have several (name, version) readings. A reading
//! counts only when its name normalizes equal to the queried package's name.

use url::Url;

use crate::name::PackageName;

const SOURCE_EXTENSIONS: &[&str] = &[".tar.gz", ".tar.bz2", ".tar", ".zip", ".tgz"];

/// Returns the version of `package` that `url` points at, if the URL names
/// an installable distribution of it. Never panics; unrecognized input is
/// simply not installable.
pub fn classify(package: &PackageName, url: &Url) -> Option<String> {
    interpretations(url)
        .into_iter()
        .find(|(name, _)| package.matches(name))
        .map(|(_, version)| version)
}

/// True when `url` points at an installable distribution of `package`.
pub fn installable(package: &PackageName, url: &Url) -> bool {
    classify(package, url).is_some()
}

/// Every (name, version) reading of the URL: basename readings first, then
/// any `#egg=` fragment readings.
fn interpretations(url: &Url) -> Vec<(String, String)> {
    let (basename, fragment) = basename_and_fragment(url);

    let mut readings = Vec::new();
    if let Some(basename) = basename {
        readings.extend(interpret_basename(&basename));
    }
    if let Some(fragment) = fragment {
        if let Some(stem) = egg_fragment(&fragment) {
            readings.extend(source_splits(stem));
        }
    }
    readings
}

/// Decoded basename of the URL path, plus the fragment to consider.
///
/// On `sourceforge.net` a trailing `download` segment is a redirect stub;
/// the real filename is the segment before it. A `#` that was
/// percent-encoded into the final segment splits it into basename and
/// fragment, shadowing the URL's own fragment.
fn basename_and_fragment(url: &Url) -> (Option<String>, Option<String>) {
    let segments: Vec<&str> = match url.path_segments() {
        Some(segments) => segments.collect(),
        None => Vec::new(),
    };

    let mut basename = segments.last().and_then(|segment| decode(segment));

    if url.host_str() == Some("sourceforge.net") && basename.as_deref() == Some("download") {
        basename = if segments.len() >= 2 {
            decode(segments[segments.len() - 2])
        } else {
            None
        };
    }

    let mut fragment = url.fragment().map(str::to_string);
    if let Some(base) = basename.take() {
        match base.split_once('#') {
            Some((before, after)) => {
                basename = Some(before.to_string());
                fragment = Some(after.to_string());
            }
            None => basename = Some(base),
        }
    }

    (basename, fragment)
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment)
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Readings of a distribution filename. `.egg.zip` is an egg in disguise;
/// eggs and wheels have a single reading, source archives have one per
/// dash-split point.
fn interpret_basename(basename: &str) -> Vec<(String, String)> {
    let basename = basename
        .strip_suffix(".zip")
        .filter(|stem| stem.ends_with(".egg"))
        .unwrap_or(basename);

    if let Some(stem) = basename.strip_suffix(".egg") {
        return egg_reading(stem).into_iter().collect();
    }
    if let Some(stem) = basename.strip_suffix(".whl") {
        return wheel_reading(stem).into_iter().collect();
    }
    for extension in SOURCE_EXTENSIONS {
        if let Some(stem) = basename.strip_suffix(extension) {
            return source_splits(stem);
        }
    }
    Vec::new()
}

/// `{name}-{version}[-{pyver}[-{platform}]]` egg stems: first two dash
/// fields, nothing to read without a dash.
fn egg_reading(stem: &str) -> Option<(String, String)> {
    let mut fields = stem.split('-');
    let name = fields.next()?;
    let version = fields.next()?;
    Some((name.to_string(), version.to_string()))
}

/// `{name}-{version}[-{build}]-{py}-{abi}-{platform}` wheel stems. The
/// version is the first dash field starting with a digit; after it there
/// must be exactly the three tags, or a digit-leading build tag plus the
/// three tags.
fn wheel_reading(stem: &str) -> Option<(String, String)> {
    let fields: Vec<&str> = stem.split('-').collect();
    let pivot = fields
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, field)| starts_with_digit(field))
        .map(|(index, _)| index)?;

    let tags = &fields[pivot + 1..];
    match tags.len() {
        3 => {}
        4 if starts_with_digit(tags[0]) => {}
        _ => return None,
    }

    Some((fields[..pivot].join("-"), fields[pivot].to_string()))
}

/// All (name, version) dash-splits of a source-archive stem, longest name
/// first; the whole-stem split with an empty version is a legitimate
/// reading. A `py<major>.<minor>` tag past the second field marks a dumb
/// binary build, which has no source readings at all.
fn source_splits(stem: &str) -> Vec<(String, String)> {
    let fields: Vec<&str> = stem.split('-').collect();
    if fields.iter().skip(2).any(|field| is_python_tag(field)) {
        return Vec::new();
    }

    (1..=fields.len())
        .rev()
        .map(|pivot| (fields[..pivot].join("-"), fields[pivot..].join("-")))
        .collect()
}

fn starts_with_digit(field: &str) -> bool {
    field.chars().next().is_some_and(|ch| ch.is_ascii_digit())
}

fn is_python_tag(field: &str) -> bool {
    let Some(version) = field.strip_prefix("py") else {
        return false;
    };
    let Some((major, minor)) = version.split_once('.') else {
        return false;
    };
    major.len() == 1
        && major.chars().all(|ch| ch.is_ascii_digit())
        && !minor.is_empty()
        && minor.chars().all(|ch| ch.is_ascii_digit())
}

/// `egg=<name>` fragments: letters, digits, dash, underscore and dot only.
fn egg_fragment(fragment: &str) -> Option<&str> {
    let stem = fragment.strip_prefix("egg=")?;
    let valid = !stem.is_empty()
        && stem
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    valid.then_some(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_str(package: &str, url: &str) -> Option<String> {
        classify(&PackageName::new(package), &Url::parse(url).unwrap())
    }

    #[test]
    fn test_classify_source_archive() {
        assert_eq!(
            classify_str("requests", "https://pypi.org/packages/requests-1.2.0.tar.gz"),
            Some("1.2.0".to_string())
        );
    }

    #[test]
    fn test_classify_all_source_extensions() {
        for extension in SOURCE_EXTENSIONS {
            let url = format!("https://example.com/foo-1.0{}", extension);
            assert_eq!(
                classify_str("foo", &url),
                Some("1.0".to_string()),
                "extension {}",
                extension
            );
        }
    }

    #[test]
    fn test_classify_rejects_other_project() {
        assert_eq!(classify_str("requests", "https://example.com/other-1.0.tar.gz"), None);
    }

    #[test]
    fn test_classify_rejects_unknown_extension() {
        assert_eq!(classify_str("foo", "https://example.com/foo-1.0.rpm"), None);
        assert_eq!(classify_str("foo", "https://example.com/about.html"), None);
        assert_eq!(classify_str("foo", "https://example.com/"), None);
    }

    #[test]
    fn test_classify_extensions_are_case_sensitive() {
        assert_eq!(classify_str("foo", "https://example.com/foo-1.0.TAR.GZ"), None);
    }

    #[test]
    fn test_classify_normalization_equivalence() {
        let url = "https://example.com/zope.interface-4.0.tar.gz";
        for spelling in ["zope.interface", "Zope_Interface", "ZOPE-INTERFACE"] {
            assert_eq!(classify_str(spelling, url), Some("4.0".to_string()), "{}", spelling);
        }
    }

    #[test]
    fn test_classify_every_dash_split_is_a_reading() {
        let url = "https://example.com/adns-python-1.1.0.tar.gz";
        assert_eq!(classify_str("adns-python", url), Some("1.1.0".to_string()));
        assert_eq!(classify_str("adns", url), Some("python-1.1.0".to_string()));
        assert_eq!(classify_str("adns-python-1.1.0", url), Some(String::new()));
    }

    #[test]
    fn test_classify_whole_stem_reading_has_empty_version() {
        assert_eq!(
            classify_str("requests", "https://example.com/requests.tar.gz"),
            Some(String::new())
        );
    }

    #[test]
    fn test_classify_rejects_dumb_binary_build() {
        assert_eq!(classify_str("foo", "https://example.com/foo-1.0-py2.7.tar.gz"), None);
        assert_eq!(classify_str("foo", "https://example.com/foo-1.0-py3.10-linux.tar.gz"), None);
    }

    #[test]
    fn test_python_tag_shapes() {
        assert!(is_python_tag("py2.7"));
        assert!(is_python_tag("py3.10"));
        assert!(!is_python_tag("py3"));
        assert!(!is_python_tag("py3.x"));
        assert!(!is_python_tag("py27"));
        assert!(!is_python_tag("cp3.7"));
    }

    #[test]
    fn test_classify_wheel() {
        assert_eq!(
            classify_str("requests", "https://example.com/requests-2.0.1-py3-none-any.whl"),
            Some("2.0.1".to_string())
        );
    }

    #[test]
    fn test_classify_wheel_dashed_name() {
        assert_eq!(
            classify_str("foo-bar", "https://example.com/foo_bar-1.0-py3-none-any.whl"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_wheel_with_build_tag() {
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1.0-2-py3-none-any.whl"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_wheel_rejects_bad_tag_count() {
        assert_eq!(classify_str("foo", "https://example.com/foo-1.0-py3-none.whl"), None);
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1-2-3-py3-none-any.whl"),
            None
        );
    }

    #[test]
    fn test_classify_wheel_rejects_non_digit_build_tag() {
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1.0-build-py3-none-any.whl"),
            None
        );
    }

    #[test]
    fn test_classify_wheel_requires_digit_version() {
        assert_eq!(classify_str("foo-bar", "https://example.com/foo-bar-py3-none-any.whl"), None);
    }

    #[test]
    fn test_classify_wheel_name_may_start_with_digit() {
        assert_eq!(
            classify_str("2to3", "https://example.com/2to3-1.0-py3-none-any.whl"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_egg() {
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1.0-py2.7.egg"),
            Some("1.0".to_string())
        );
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1.0.egg"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_egg_zip() {
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1.0.egg.zip"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_egg_without_dash_has_no_reading() {
        assert_eq!(classify_str("foo", "https://example.com/foo.egg"), None);
    }

    #[test]
    fn test_classify_plain_zip_is_source_not_egg() {
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1.0.zip"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_egg_fragment() {
        assert_eq!(
            classify_str("foo", "https://github.com/user/foo/tarball/master#egg=foo-1.0"),
            Some("1.0".to_string())
        );
        assert_eq!(
            classify_str("foo", "https://github.com/user/foo/tarball/master#egg=foo"),
            Some(String::new())
        );
    }

    #[test]
    fn test_classify_egg_fragment_rejects_other_characters() {
        assert_eq!(
            classify_str("foo", "https://example.com/download#egg=foo&version=1.0"),
            None
        );
        assert_eq!(classify_str("foo", "https://example.com/download#foo"), None);
    }

    #[test]
    fn test_classify_basename_reading_wins_over_fragment() {
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1.0.tar.gz#egg=foo-2.0"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_sourceforge_download_stub() {
        assert_eq!(
            classify_str(
                "foo",
                "http://sourceforge.net/projects/foo/files/foo-1.0.tar.gz/download"
            ),
            Some("1.0".to_string())
        );
        // only sourceforge gets the stub treatment
        assert_eq!(
            classify_str("foo", "http://example.com/files/foo-1.0.tar.gz/download"),
            None
        );
    }

    #[test]
    fn test_classify_percent_encoded_basename() {
        assert_eq!(
            classify_str("foo bar", "https://example.com/foo%20bar-1.0.tar.gz"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_ignores_query_string() {
        assert_eq!(
            classify_str("foo", "https://example.com/foo-1.0.tar.gz?token=abc"),
            Some("1.0".to_string())
        );
    }

    #[test]
    fn test_classify_encoded_hash_splits_fragment_from_basename() {
        assert_eq!(
            classify_str("foo", "https://example.com/download%23egg=foo-3.0"),
            Some("3.0".to_string())
        );
    }

    #[test]
    fn test_classify_windows_installer_not_installable() {
        assert_eq!(classify_str("foo", "https://example.com/foo-1.0.win32.exe"), None);
    }

    #[test]
    fn test_installable_tracks_classify() {
        let package = PackageName::new("foo");
        let yes = Url::parse("https://example.com/foo-1.0.tar.gz").unwrap();
        let no = Url::parse("https://example.com/bar-1.0.tar.gz").unwrap();
        assert!(installable(&package, &yes));
        assert!(!installable(&package, &no));
    }
}
