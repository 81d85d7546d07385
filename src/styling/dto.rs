use serde::Serialize;

use super::shopping::KeywordLinks;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub text: String,
    pub whatsapp_url: String,
    pub links: Vec<KeywordLinks>,
}
