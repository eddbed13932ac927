use {
    super::{FlatMap, Separator},
    itertools::Itertools,
    serde_json::{Map, Value},
    tap::{Pipe, Tap},
    tracing::instrument,
};

/// Binds the nested form of every key of `flat` under `prefix` into `out`.
///
/// Keys are visited in lexicographic order and a segment is bound at most once per
/// level, so on a conflict (`a` next to `a.b`) the first key in that order wins.
/// Segments already present in `out` are left untouched.
#[instrument(skip(flat, out))]
pub fn expand_into(
    flat: &FlatMap,
    prefix: &str,
    separator: &Separator,
    out: &mut Map<String, Value>,
) {
    let entries = flat
        .iter()
        .sorted_by_key(|(key, _)| *key)
        .map(|(key, value)| (key.as_str(), value))
        .collect::<Vec<_>>();
    expand_level(&entries, &separator.base(prefix), separator, out)
}

pub fn expanded(flat: &FlatMap, prefix: &str, separator: &Separator) -> Map<String, Value> {
    Map::new().tap_mut(|out| expand_into(flat, prefix, separator, out))
}

/// One grouping pass: every call rescans all `entries` and keeps the ones below `base`.
///
/// `base` grows by at least one separator per level, which bounds the recursion even
/// for keys with empty segments.
fn expand_level(
    entries: &[(&str, &Value)],
    base: &str,
    separator: &Separator,
    out: &mut Map<String, Value>,
) {
    entries
        .iter()
        .filter_map(|&(key, value)| key.strip_prefix(base).map(|rest| (key, rest, value)))
        .for_each(|(key, rest, value)| {
            let (segment, nested) = match rest.find(separator.as_str()) {
                Some(idx) => (&rest[..idx], true),
                None => (rest, false),
            };
            if let Some(bound) = out.get(segment) {
                if bound.is_object() != nested {
                    tracing::trace!(
                        key,
                        segment,
                        "segment already bound with another shape, dropping key"
                    );
                }
                return;
            }
            let value = match nested {
                false => value.clone(),
                true => Map::new()
                    .tap_mut(|children| {
                        let base = format!("{base}{segment}{separator}");
                        expand_level(entries, &base, separator, children)
                    })
                    .pipe(Value::Object),
            };
            out.insert(segment.to_owned(), value);
        })
}
