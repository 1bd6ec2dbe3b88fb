use serde::Serialize;
use serde::de::DeserializeOwned;

/// A public Gate.io REST endpoint: the path under the API base, the query it
/// takes and the JSON it answers with.
pub trait Method {
    const PATH: &'static str;

    type Response: DeserializeOwned;
    type Params: Serialize;

    fn url(base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), Self::PATH)
    }
}
