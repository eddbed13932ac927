use {
    crate::FlattenedRef,
    serde::{Serialize, ser::SerializeMap},
};

impl<T> Serialize for FlattenedRef<'_, T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        crate::flatten(self.0)
            .map_err(serde::ser::Error::custom)
            .and_then(move |flat| {
                serializer
                    .serialize_map(Some(flat.len()))
                    .and_then(|mut map| {
                        flat.iter()
                            .try_for_each(|(key, value)| map.serialize_entry(key, value))
                            .and_then(|()| map.end())
                    })
            })
    }
}

#[cfg(test)]
mod tests {
    use {crate::Flattened, serde_json::json, std::collections::BTreeMap};

    #[test]
    fn test_borrowed_serialization_matches_owned() {
        let nested = BTreeMap::from([("outer", BTreeMap::from([("inner", 1)]))]);
        let owned = Flattened(nested.clone());
        assert_eq!(
            serde_json::to_value(owned.as_ref()).unwrap(),
            json!({"outer.inner": 1})
        );
        assert_eq!(
            serde_json::to_value(&owned).unwrap(),
            serde_json::to_value(owned.as_ref()).unwrap()
        );
    }
}
