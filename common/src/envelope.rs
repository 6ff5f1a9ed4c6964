use serde::Deserialize;

use crate::api_error::ApiErrorCode;
use crate::error::ForumError;
use crate::post::PostId;

/// JSON body returned by `POST /api`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<ApiErrorCode>,
    #[serde(default)]
    pub longid: Option<u64>,
    /// Split topic/post ids, sent alongside `longid` on success.
    #[serde(default)]
    pub topic: Option<u32>,
    #[serde(default)]
    pub post: Option<u16>,
    /// Echo of a moderator command message that was executed instead of posted.
    #[serde(default, rename = "mod-operation")]
    pub mod_operation: Option<String>,
}

impl ResponseEnvelope {
    pub fn parse(body: &str) -> Result<Self, ForumError> {
        Ok(serde_json::from_str(body)?)
    }

    /// The new post to navigate to. A zero id counts as absent.
    pub fn post_id(&self) -> Option<PostId> {
        self.longid.filter(|id| *id != 0).map(PostId)
    }
}

const ALERT_PREFIX: &str = "发生错误：";

/// Text of the alert shown when a submission does not go through.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorReport {
    /// The server answered with `success: false`.
    Rejected(Option<ApiErrorCode>),
    /// The request failed or the body could not be read.
    Failed(ForumError),
}

impl ErrorReport {
    pub fn text(&self) -> String {
        match self {
            ErrorReport::Rejected(code) => {
                let (code, message) = match code {
                    Some(code) => (code.as_str(), code.message().unwrap_or("")),
                    None => ("", ""),
                };
                format!("{ALERT_PREFIX}\ncode: {code}\n{message}")
            }
            ErrorReport::Failed(e) => format!("{ALERT_PREFIX}\n{e}"),
        }
    }
}
