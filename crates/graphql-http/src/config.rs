#[derive(Debug, Default, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpQueryConfig {
    /// Accept a list of requests as payload.
    pub batching: bool,
    /// In a batch, answer `null` for a request that cannot be executed instead of failing the
    /// whole batch.
    pub contain_errors: bool,
    /// Indent the JSON responses.
    pub pretty: bool,
}
