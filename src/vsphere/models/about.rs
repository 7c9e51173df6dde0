use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VsAbout {
    #[serde(rename = "FullName", alias = "fullName")]
    pub full_name: String,
}
