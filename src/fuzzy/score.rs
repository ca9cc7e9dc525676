//! Score normalisation over the `nucleo-matcher` oracle
//!
//! The oracle returns unbounded "higher is better" integers. Search results
//! expose a score in `[0, 1]` where 0 is a perfect match. Every raw score is
//! related to two references: the query against itself, which collects every
//! word-boundary bonus, and the query as a contiguous run inside a word,
//! which collects none. Contiguous hits land in `[0, CONTIGUOUS_BAND]`,
//! scattered hits above it.

use super::SearchOptions;
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};

/// Widest quality a contiguous, unbounded match can get
pub(crate) const CONTIGUOUS_BAND: f64 = 0.05;

/// Compiled query ready to be scored against field values
pub(crate) struct Query {
    pattern: Pattern,
    /// Score of the query against its own text
    ideal: u32,
    /// Score of the query as a contiguous run in the middle of a word
    inner: u32,
}

/// Quality of one field value, lower is better
pub(crate) struct ValueScore {
    pub quality: f64,
    pub indices: Vec<u32>,
}

impl Query {
    /// Compile `query`; `None` when nothing is left to match after trimming
    pub fn compile(query: &str, options: &SearchOptions, matcher: &mut Matcher) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }

        let pattern = if options.use_extended_search {
            Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart)
        } else {
            Pattern::new(query, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy)
        };
        if pattern.atoms.is_empty() {
            return None;
        }

        let mut ideal = 0;
        let mut inner = 0;
        let mut buf = Vec::new();
        for atom in pattern.atoms.iter().filter(|atom| !atom.negative) {
            let Some(own) = atom.score(atom.needle_text(), matcher) else {
                continue;
            };
            // anchored atoms cannot sit inside a word
            let embedded = format!("x{}", atom.needle_text());
            let run = atom
                .score(Utf32Str::new(&embedded, &mut buf), matcher)
                .unwrap_or(own);
            ideal += u32::from(own);
            inner += u32::from(run.min(own));
        }

        Some(Self {
            pattern,
            ideal,
            inner,
        })
    }

    /// Score a single value. `None` means no match within the threshold.
    pub fn score_value(
        &self,
        value: &str,
        options: &SearchOptions,
        matcher: &mut Matcher,
        buf: &mut Vec<char>,
    ) -> Option<ValueScore> {
        let haystack = Utf32Str::new(value, buf);
        let mut indices = Vec::new();
        let raw = self.pattern.indices(haystack, matcher, &mut indices)?;
        indices.sort_unstable();
        indices.dedup();

        let mut quality = self.quality(raw);

        if !options.ignore_location {
            let start = indices.first().copied().unwrap_or(0);
            quality += f64::from(start) / f64::from(options.distance.max(1));
        }

        (quality <= options.threshold).then(|| ValueScore {
            quality: quality.min(1.0),
            indices,
        })
    }

    fn quality(&self, raw: u32) -> f64 {
        if self.ideal == 0 {
            // only negated atoms: passing them is all there is to match
            return 0.0;
        }
        if raw >= self.ideal {
            return 0.0;
        }
        if raw >= self.inner {
            let span = f64::from(self.ideal - self.inner).max(1.0);
            return CONTIGUOUS_BAND * f64::from(self.ideal - raw) / span;
        }
        let inner = f64::from(self.inner.max(1));
        CONTIGUOUS_BAND + (1.0 - CONTIGUOUS_BAND) * (1.0 - f64::from(raw) / inner)
    }
}

/// Field-length norm: longer values weigh less
pub(crate) fn field_norm(value: &str, options: &SearchOptions) -> f64 {
    if options.ignore_field_norm {
        return 1.0;
    }
    let tokens = value.split_whitespace().count().max(1);
    #[allow(clippy::cast_precision_loss)]
    let tokens = tokens as f64;
    1.0 / tokens.powf(0.5 * options.field_norm_weight)
}

/// Combine one matched field into the running record score
pub(crate) fn combine(total: f64, quality: f64, weight: f64, norm: f64) -> f64 {
    let quality = if quality <= 0.0 { f64::EPSILON } else { quality };
    total * quality.powf(weight * norm)
}
