//! Numeric literal grammar and value resolution.
//!
//! Literal forms, tried in priority order:
//!
//! ```text
//! 0x<hex>   hexadecimal integer
//! h<hex>    hexadecimal integer
//! b<bin>    binary integer
//! o<oct>    octal integer
//! <int>     decimal integer
//! <float>   decimal float, optionally with exponent
//! ```
//!
//! A token matching none of them is forwarded verbatim to the caller's
//! [`SymbolResolver`].

use tracing::trace;

use super::program::{BuildError, BuildResult};
use super::symbol::{SymbolResolver, ValueSource};

/// Parse a numeric literal.
///
/// Returns `None` when the token is not a literal. Prefixed integers are
/// converted to `f64` after parsing as `i64`.
pub fn parse_literal(token: &str) -> Option<f64> {
    let radix_int = |digits: &str, radix: u32| i64::from_str_radix(digits, radix).ok().map(|i| i as f64);

    if let Some(digits) = token.strip_prefix("0x") {
        return radix_int(digits, 16);
    }
    if let Some(digits) = token.strip_prefix('h') {
        return radix_int(digits, 16);
    }
    if let Some(digits) = token.strip_prefix('b') {
        return radix_int(digits, 2);
    }
    if let Some(digits) = token.strip_prefix('o') {
        return radix_int(digits, 8);
    }

    // "-0" keeps its sign
    token.parse::<f64>().ok()
}

/// Resolve a value token to its source.
///
/// Literals become constants. Anything else goes to `resolver`; a missing
/// resolver or a resolver failure is reported as
/// [`BuildError::UnresolvedSymbol`].
pub fn parse_value(token: &str, resolver: Option<&dyn SymbolResolver>) -> BuildResult<ValueSource> {
    if let Some(value) = parse_literal(token) {
        return Ok(ValueSource::Constant(value));
    }

    let Some(resolver) = resolver else {
        return Err(BuildError::UnresolvedSymbol {
            symbol: token.to_string(),
            cause: None,
        });
    };

    let source = resolver.resolve(token).map_err(|e| BuildError::UnresolvedSymbol {
        symbol: token.to_string(),
        cause: Some(e),
    })?;
    trace!(target: "rpnjit::program", symbol = token, constant = source.is_constant(), "resolved symbol");
    Ok(source)
}
