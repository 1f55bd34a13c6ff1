//! Offset reconciliation from UTF-16 code units to scalar characters.
//!
//! cTAKES runs on the JVM and reports `begin`/`end` as indexes into the UTF-16 encoding of the
//! document. Consumers index documents by Unicode scalar value (`char`). The two agree until the
//! text contains a character above U+FFFF: each such character takes two code units but counts
//! as one `char`, so every later offset is shifted by one.
//!
//! Both endpoints are recomputed from the original document. The mention text is never used to
//! derive `end`, because the server may have normalized it.

use crate::annotation::AnnotationIndex;
use crate::{CoreError, CoreResult};
use nlp_types::Span;
use std::iter;

/// Rewrites mention offsets of one document.
#[derive(Clone, Debug)]
pub struct IndexReconciler<'a> {
    document: &'a str,
    /// Document length in UTF-16 code units.
    unit_len: usize,
    /// Scalar index for every code-unit index `0..=unit_len`; `None` inside a surrogate pair.
    /// Empty when no character needs a surrogate pair.
    scalar_at: Vec<Option<usize>>,
}

impl<'a> IndexReconciler<'a> {
    pub fn new(document: &'a str) -> Self {
        let unit_len: usize = document.chars().map(char::len_utf16).sum();
        let scalar_at = if unit_len == document.chars().count() {
            Vec::new()
        } else {
            scalar_table(document, unit_len)
        };
        Self {
            document,
            unit_len,
            scalar_at,
        }
    }

    /// True when code-unit and scalar indexes coincide for this document.
    pub fn is_noop(&self) -> bool {
        self.scalar_at.is_empty()
    }

    /// Convert every mention's offsets to scalar-character indexes.
    ///
    /// Offsets past the end of the document clamp to its end.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOffset`] if an offset points between the two halves of a
    /// surrogate pair.
    pub fn fix(&self, index: AnnotationIndex) -> CoreResult<AnnotationIndex> {
        let mut shifted = 0usize;
        let fixed = index.try_map_mentions(|mention| {
            let raw = mention.span();
            let begin = self.scalar_index(raw.begin())?;
            let end = self.scalar_index(raw.end())?;
            let span = Span::new(begin, end).map_err(|e| CoreError::InvalidOffset {
                offset: raw.begin(),
                reason: e.to_string(),
            })?;
            if span != raw {
                shifted += 1;
            }
            Ok(mention.with_span(span))
        })?;

        tracing::debug!(shifted, noop = self.is_noop(), "reconciled utf-16 offsets");
        Ok(fixed)
    }

    /// Scalar index of a code-unit offset, clamped to the document end.
    fn scalar_index(&self, offset: usize) -> CoreResult<usize> {
        let offset = offset.min(self.unit_len);
        if self.is_noop() {
            return Ok(offset);
        }
        self.scalar_at[offset].ok_or_else(|| CoreError::InvalidOffset {
            offset,
            reason: "offset splits a surrogate pair".into(),
        })
    }

    /// Check that every mention's text equals the document text at its span.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ReconciliationMismatch`] for the first mention that disagrees.
    pub fn verify(&self, index: &AnnotationIndex) -> CoreResult<()> {
        let bounds = char_bounds(self.document);
        for mention in index.all_mentions(None) {
            let actual = slice_chars(self.document, &bounds, mention.span());
            if actual != mention.text() {
                return Err(CoreError::ReconciliationMismatch {
                    span: mention.span(),
                    expected: mention.text().to_owned(),
                    actual: actual.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Reconcile `index` against `document` without checking the result.
pub fn reconcile(document: &str, index: AnnotationIndex) -> CoreResult<AnnotationIndex> {
    IndexReconciler::new(document).fix(index)
}

/// Text of `document` covered by a scalar-character span; out-of-range ends clamp.
pub fn document_text(document: &str, span: Span) -> &str {
    slice_chars(document, &char_bounds(document), span)
}

/// Code-unit to scalar index table, built in one pass over the document.
fn scalar_table(document: &str, unit_len: usize) -> Vec<Option<usize>> {
    let mut table = Vec::with_capacity(unit_len + 1);
    for (scalar, c) in document.chars().enumerate() {
        table.push(Some(scalar));
        if c.len_utf16() == 2 {
            table.push(None);
        }
    }
    table.push(Some(document.chars().count()));
    table
}

/// Byte offset of every char boundary, including the end of the string.
fn char_bounds(document: &str) -> Vec<usize> {
    document
        .char_indices()
        .map(|(i, _)| i)
        .chain(iter::once(document.len()))
        .collect()
}

fn slice_chars<'d>(document: &'d str, bounds: &[usize], span: Span) -> &'d str {
    let last = bounds.len() - 1;
    let begin = bounds[span.begin().min(last)];
    let end = bounds[span.end().min(last)];
    &document[begin..end]
}
