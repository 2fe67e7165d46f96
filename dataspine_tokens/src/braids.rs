use aliri_braid::braid;
use std::fmt;

/// Implements redacted formatting for a secret string
///
/// Plain formatting prints only the label. The alternate `Debug` form reveals
/// a prefix of `$reveal` characters (or the formatter width, if given); the
/// alternate `Display` form reveals the whole secret.
macro_rules! redacted_fmt {
    ($ty:ty: $label:literal, $reveal:literal) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if !f.alternate() {
                    return f.write_str(concat!("***", $label, "***"));
                }

                f.write_str("\"")?;
                reveal_prefix(self.as_str(), f, $reveal)?;
                f.write_str("\"")
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if f.alternate() {
                    reveal_prefix(self.as_str(), f, usize::MAX)
                } else {
                    f.write_str(concat!("***", $label, "***"))
                }
            }
        }
    };
}

fn reveal_prefix(secret: &str, f: &mut fmt::Formatter, default_len: usize) -> fmt::Result {
    let max_len = f.width().unwrap_or(default_len);
    if max_len <= 1 {
        return f.write_str("…");
    }

    match secret.char_indices().nth(max_len - 1) {
        Some((end, _)) => {
            f.write_str(&secret[..end])?;
            f.write_str("…")
        }
        None => f.write_str(secret),
    }
}

/// A Dataspine access token, as issued by the token exchange
#[braid(serde, debug = "owned", display = "owned")]
pub struct AccessToken;

redacted_fmt!(AccessTokenRef: "ACCESS TOKEN", 15);

/// A proof of identity presented to the token exchange
///
/// Depending on the trust model this is an OAuth2 ID token or an encoded AWS
/// identity proof.
#[braid(serde, debug = "owned", display = "owned")]
pub struct SubjectToken;

redacted_fmt!(SubjectTokenRef: "SUBJECT TOKEN", 5);
