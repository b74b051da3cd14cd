use serde_json::Value;

use crate::models::{EntityBag, TaggedSpan};

struct OpenGroup<'a> {
    label: &'a str,
    pieces: Vec<String>,
}

impl OpenGroup<'_> {
    fn flush_into(self, merged: &mut EntityBag) {
        // A later disjoint run of the same label replaces the earlier one.
        merged.insert(self.label, Value::String(self.pieces.concat()));
    }
}

/// Merges positionally adjacent spans that share a label into one value per label.
///
/// A group ends when the label changes or when the next span starts more than
/// one character after the previous span ended. Continuation fragments are
/// glued onto the previous piece; other fragments are joined with a space.
pub fn merge_spans(spans: &[TaggedSpan]) -> EntityBag {
    let mut merged = EntityBag::new();
    let mut open: Option<OpenGroup<'_>> = None;
    let mut last_end: Option<usize> = None;

    for span in spans {
        let adjacent = last_end.is_some_and(|end| span.start <= end + 1);
        let extends_open = matches!(&open, Some(group) if group.label == span.label) && adjacent;

        if extends_open {
            if let Some(group) = open.as_mut() {
                if span.continuation {
                    match group.pieces.last_mut() {
                        Some(last) => last.push_str(&span.text),
                        None => group.pieces.push(span.text.clone()),
                    }
                } else {
                    group.pieces.push(format!(" {}", span.text));
                }
            }
        } else {
            if let Some(previous) = open.take() {
                previous.flush_into(&mut merged);
            }
            open = Some(OpenGroup {
                label: &span.label,
                pieces: vec![span.text.clone()],
            });
        }

        last_end = Some(span.end);
    }

    if let Some(group) = open {
        group.flush_into(&mut merged);
    }

    merged
}
