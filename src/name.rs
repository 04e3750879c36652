/// A package name as supplied by the caller, paired with its normalized form.
///
/// Indexes and distribution filenames spell the same project many ways
/// (`Django`, `django`, `zope.interface`, `zope_interface`). Comparisons and
/// listing URLs use the normalized form; display keeps the caller's spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageName {
    raw: String,
    normalized: String,
}

impl PackageName {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            normalized: normalize(raw),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// True when `other` spells this package's name, modulo case and
    /// separator differences.
    pub fn matches(&self, other: &str) -> bool {
        normalize(other) == self.normalized
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Canonicalizes a name per the index ecosystem's safe-name convention:
/// ASCII-lowercase, with every run of `-`, `_` and `.` collapsed into a
/// single dash. Total over any input.
pub fn normalize(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator_run = false;
    for ch in name.chars() {
        if matches!(ch, '-' | '_' | '.') {
            in_separator_run = true;
            continue;
        }
        if in_separator_run {
            normalized.push('-');
            in_separator_run = false;
        }
        normalized.push(ch.to_ascii_lowercase());
    }
    if in_separator_run {
        normalized.push('-');
    }
    normalized
}
