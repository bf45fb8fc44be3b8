use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Auth provider user ID
    pub id: String,
    /// Nickname shown in the navigation bar
    #[serde(alias = "nickname", alias = "username")]
    pub display_name: String,
    /// Credit balance
    #[serde(default)]
    pub credits: i64,
}

impl User {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, credits: i64) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            credits,
        }
    }
}
