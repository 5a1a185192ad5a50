//! Benchmark name parsing.
//!
//! Google Benchmark flattens the family, the library under test and the
//! problem size into a single string, e.g. `BM_Ddot_OpenBLAS/524288`.
//! This module splits such a name back into its parts.
//!
//! Two naming conventions are understood:
//!
//! 1. `BM_<Family>_<Library>/<size>`, family and library separated by an
//!    underscore
//! 2. `BM_<FamilyLibrary>/<size>`, no underscore. Here the library is
//!    recognized as a suffix from a fixed list of known library names
//!    (longest match wins, case-insensitive).
//!
//! Family and library are lowercased so that `BM_Ddot_OpenBLAS` and
//! `BM_DdotOpenBLAS` end up in the same chart series.
//! Anything after the size (e.g. `/min_time:2.0`, `/real_time`) is
//! ignored. A name that fits neither convention is a [`NameError`], and
//! it is up to the caller to skip or abort.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Library names recognized as a suffix when family and library are not
/// separated by an underscore. Longest first, so `BM_Daxpysimple` is
/// `daxpy` + `simple`, not a failed match on a shorter entry.
const KNOWN_LIBRARIES: &[&str] = &["accelerate", "openblas", "simple", "neon", "amx"];

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^BM_([A-Za-z]+)(?:_([A-Za-z]+))?/([0-9]+)(?:/.*)?$").unwrap());

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BenchName {
    pub family: String,
    pub library: String,
    pub size: u64,
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum NameError {
    #[error("name does not match `BM_<family>[_<library>]/<size>`")]
    Pattern,
    #[error("cannot split `{ident}` into family and library (no known library suffix)")]
    Split { ident: String },
    #[error("size `{digits}` does not fit into u64")]
    SizeOutOfRange { digits: String },
}

impl BenchName {
    /// Parses a Google Benchmark run name.
    ///
    /// The match is anchored and whitespace is never trimmed, so padded
    /// or decorated names fail instead of being misread.
    pub fn parse(name: &str) -> Result<BenchName, NameError> {
        let captures = NAME_PATTERN.captures(name).ok_or(NameError::Pattern)?;

        let digits = &captures[3];
        let size = digits
            .parse::<u64>()
            .map_err(|_| NameError::SizeOutOfRange {
                digits: digits.to_string(),
            })?;

        let (family, library) = match captures.get(2) {
            Some(library) => (
                captures[1].to_ascii_lowercase(),
                library.as_str().to_ascii_lowercase(),
            ),
            None => split_joined(&captures[1]).ok_or_else(|| NameError::Split {
                ident: captures[1].to_string(),
            })?,
        };

        Ok(BenchName {
            family,
            library,
            size,
        })
    }
}

/// Splits e.g. `DdotOpenBLAS` into (`ddot`, `openblas`) by matching a
/// known library name as suffix. The remaining family part must be
/// non-empty.
fn split_joined(ident: &str) -> Option<(String, String)> {
    let lowered = ident.to_ascii_lowercase();
    for library in KNOWN_LIBRARIES {
        if let Some(family) = lowered.strip_suffix(library) {
            if !family.is_empty() {
                return Some((family.to_string(), (*library).to_string()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(name: &str) -> BenchName {
        BenchName::parse(name).unwrap()
    }

    #[test]
    fn test_underscore_convention() {
        assert_eq!(
            parsed("BM_Ddot_Accelerate/524288"),
            BenchName {
                family: "ddot".into(),
                library: "accelerate".into(),
                size: 524288,
            }
        );
    }

    #[test]
    fn test_joined_convention() {
        assert_eq!(
            parsed("BM_DdotOpenBLAS/8192"),
            BenchName {
                family: "ddot".into(),
                library: "openblas".into(),
                size: 8192,
            }
        );
    }

    #[test]
    fn test_joined_prefers_longest_suffix() {
        // "GemvSimple" must split on "simple", not fail outright
        let name = parsed("BM_GemvSimple/64");
        assert_eq!(name.family, "gemv");
        assert_eq!(name.library, "simple");
    }

    #[test]
    fn test_lowercasing_merges_spellings() {
        assert_eq!(parsed("BM_GEMM_NEON/16"), parsed("BM_Gemm_Neon/16"));
    }

    #[test]
    fn test_trailing_segments_ignored() {
        let name = parsed("BM_Ddot_Neon/1024/real_time");
        assert_eq!(name.size, 1024);
        assert_eq!(parsed("BM_Ddot_Neon/1024/min_time:2.0").size, 1024);
    }

    #[test]
    fn test_size_zero_is_a_size() {
        assert_eq!(parsed("BM_Ddot_Amx/0").size, 0);
    }

    #[test]
    fn test_missing_prefix() {
        assert_eq!(BenchName::parse("Ddot_Neon/8"), Err(NameError::Pattern));
        // prefix match is case-sensitive, benchmark sources always spell it BM_
        assert_eq!(BenchName::parse("bm_Ddot_Neon/8"), Err(NameError::Pattern));
    }

    #[test]
    fn test_missing_size() {
        assert_eq!(BenchName::parse("BM_Ddot_Neon"), Err(NameError::Pattern));
        assert_eq!(BenchName::parse("BM_Ddot_Neon/"), Err(NameError::Pattern));
        assert_eq!(BenchName::parse("BM_Ddot_Neon/x8"), Err(NameError::Pattern));
    }

    #[test]
    fn test_extra_underscores_rejected() {
        assert_eq!(
            BenchName::parse("BM_Ddot_Open_BLAS/8"),
            Err(NameError::Pattern)
        );
        assert_eq!(BenchName::parse("BM__Neon/8"), Err(NameError::Pattern));
        assert_eq!(BenchName::parse("BM_Ddot_/8"), Err(NameError::Pattern));
    }

    #[test]
    fn test_whitespace_never_trimmed() {
        assert_eq!(
            BenchName::parse(" BM_Ddot_Neon/8"),
            Err(NameError::Pattern)
        );
        assert_eq!(
            BenchName::parse("BM_Ddot_Neon/8 "),
            Err(NameError::Pattern)
        );
    }

    #[test]
    fn test_digits_in_family_rejected() {
        assert_eq!(
            BenchName::parse("BM_Gemm2_Neon/8"),
            Err(NameError::Pattern)
        );
    }

    #[test]
    fn test_unknown_joined_library() {
        assert_eq!(
            BenchName::parse("BM_DdotMKL/8"),
            Err(NameError::Split {
                ident: "DdotMKL".into()
            })
        );
    }

    #[test]
    fn test_joined_library_without_family() {
        assert_eq!(
            BenchName::parse("BM_OpenBLAS/8"),
            Err(NameError::Split {
                ident: "OpenBLAS".into()
            })
        );
    }

    #[test]
    fn test_size_overflow() {
        assert_eq!(
            BenchName::parse("BM_Ddot_Neon/99999999999999999999"),
            Err(NameError::SizeOutOfRange {
                digits: "99999999999999999999".into()
            })
        );
    }
}
