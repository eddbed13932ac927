use {
    super::lenient::Lenient,
    crate::{FlatMap, Flattened},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    serde_json::Value,
    tap::Pipe,
    tracing::instrument,
};

impl<T> Serialize for Flattened<T>
where
    T: Serialize,
{
    #[instrument(skip_all)]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_ref().serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Flattened<T>
where
    T: DeserializeOwned,
{
    /// Leaves may be typed json or plain text; text is parsed as the field's type.
    #[instrument(skip(deserializer))]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        FlatMap::deserialize(deserializer)
            .map(|flat| crate::expand(&flat).pipe(Value::Object))
            .and_then(|value| T::deserialize(Lenient(value)).map_err(serde::de::Error::custom))
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::Flattened,
        serde::{Deserialize, Serialize},
        serde_json::json,
    };

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Database {
        host: String,
        port: u16,
    }

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    struct Config {
        name: String,
        verbose: bool,
        database: Database,
    }

    fn config() -> Config {
        Config {
            name: "app".into(),
            verbose: true,
            database: Database {
                host: "localhost".into(),
                port: 5432,
            },
        }
    }

    #[test_log::test]
    fn test_serializes_as_flat_map() -> anyhow::Result<()> {
        let got = serde_json::to_value(Flattened(config()))?;
        let expected = json!({
            "name": "app",
            "verbose": true,
            "database.host": "localhost",
            "database.port": 5432
        });
        anyhow::ensure!(got == expected, "expected:\n{expected}\n\ngot:\n{got}");
        Ok(())
    }

    #[test_log::test]
    fn test_deserializes_from_flat_map() -> anyhow::Result<()> {
        let Flattened(got) = serde_json::from_value::<Flattened<Config>>(json!({
            "database.port": 5432,
            "name": "app",
            "database.host": "localhost",
            "verbose": true
        }))?;
        anyhow::ensure!(got == config(), "got:\n{got:#?}");
        Ok(())
    }

    #[test_log::test]
    fn test_deserializes_from_text_leaves() -> anyhow::Result<()> {
        let Flattened(got) = serde_json::from_value::<Flattened<Config>>(json!({
            "name": "app",
            "verbose": "true",
            "database.host": "localhost",
            "database.port": "5432"
        }))?;
        anyhow::ensure!(got == config(), "got:\n{got:#?}");
        Ok(())
    }

    #[test]
    fn test_missing_field_is_reported() {
        let error = serde_json::from_value::<Flattened<Config>>(json!({
            "name": "app",
            "verbose": true,
            "database.host": "localhost"
        }))
        .unwrap_err();
        assert!(error.to_string().contains("port"), "{error}");
    }
}
