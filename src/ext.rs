use {
    crate::{FlatMap, Result, Separator},
    serde::Serialize,
    serde_json::{Map, Value},
};

#[extension_traits::extension(pub trait FlatMapExt)]
impl Map<String, Value> {
    fn expand_nested(&self) -> Map<String, Value> {
        crate::expand(self)
    }

    fn expand_nested_with(&self, separator: &str) -> Result<Map<String, Value>> {
        crate::expand_with_separator(self, separator)
    }

    fn expand_nested_by(&self, separator: &Separator) -> Map<String, Value> {
        crate::expand_prefixed_with(self, "", separator)
    }
}

#[extension_traits::extension(pub trait FlattenExt)]
impl<T: Serialize> T {
    fn to_flat(&self) -> Result<FlatMap> {
        crate::flatten(self)
    }

    fn to_flat_with(&self, separator: &str) -> Result<FlatMap> {
        crate::flatten_with_separator(self, separator)
    }

    fn to_flat_by(&self, separator: &Separator) -> Result<FlatMap> {
        crate::flatten_prefixed_with(self, "", separator)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn test_method_syntax() -> anyhow::Result<()> {
        let nested = json!({"server": {"port": 8080, "tls": {"enabled": false}}});
        let flat = nested.to_flat_with("_")?;
        anyhow::ensure!(
            Value::Object(flat.clone()) == json!({"server_port": 8080, "server_tls_enabled": false}),
            "got {flat:?}"
        );
        anyhow::ensure!(Value::Object(flat.expand_nested_with("_")?) == nested);
        anyhow::ensure!(Value::Object(nested.to_flat()?.expand_nested()) == nested);
        Ok(())
    }

    #[test]
    fn test_validated_separator() -> anyhow::Result<()> {
        let separator = Separator::new("::")?;
        let nested = json!({"a": {"b": 1}});
        let flat = nested.to_flat_by(&separator)?;
        anyhow::ensure!(Value::Object(flat.clone()) == json!({"a::b": 1}), "got {flat:?}");
        anyhow::ensure!(Value::Object(flat.expand_nested_by(&separator)) == nested);
        Ok(())
    }
}
