//! Error codes returned by `POST /api` when `success` is false.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured rejection reason from the submission endpoint.
///
/// Codes the client does not know are kept verbatim in `Unknown` and render
/// with an empty description.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApiErrorCode {
    BadRequest,
    InternalError,
    RecaptchaNeeded,
    RecaptchaFailed,
    NoMoreNewUsers,
    MessageTooShort,
    TopicLocked,
    ImageUploadFailed,
    ImageUploadDisabled,
    ImageInvalidFormat,
    ImageDiskError,
    Unknown(String),
}

impl ApiErrorCode {
    pub fn known() -> &'static [ApiErrorCode] {
        &[
            ApiErrorCode::BadRequest,
            ApiErrorCode::InternalError,
            ApiErrorCode::RecaptchaNeeded,
            ApiErrorCode::RecaptchaFailed,
            ApiErrorCode::NoMoreNewUsers,
            ApiErrorCode::MessageTooShort,
            ApiErrorCode::TopicLocked,
            ApiErrorCode::ImageUploadFailed,
            ApiErrorCode::ImageUploadDisabled,
            ApiErrorCode::ImageInvalidFormat,
            ApiErrorCode::ImageDiskError,
        ]
    }

    /// Wire form, e.g. `message-too-short`.
    pub fn as_str(&self) -> &str {
        match self {
            ApiErrorCode::BadRequest => "bad-request",
            ApiErrorCode::InternalError => "internal-error",
            ApiErrorCode::RecaptchaNeeded => "recaptcha-needed",
            ApiErrorCode::RecaptchaFailed => "recaptcha-failed",
            ApiErrorCode::NoMoreNewUsers => "no-more-new-users",
            ApiErrorCode::MessageTooShort => "message-too-short",
            ApiErrorCode::TopicLocked => "topic-locked",
            ApiErrorCode::ImageUploadFailed => "image-upload-failed",
            ApiErrorCode::ImageUploadDisabled => "image-upload-disabled",
            ApiErrorCode::ImageInvalidFormat => "image-invalid-format",
            ApiErrorCode::ImageDiskError => "image-disk-error",
            ApiErrorCode::Unknown(code) => code,
        }
    }

    /// Human-readable description shown to the poster, `None` for unknown codes.
    pub fn message(&self) -> Option<&'static str> {
        let text = match self {
            ApiErrorCode::BadRequest => "无效请求 ",
            ApiErrorCode::InternalError => "内部错误",
            ApiErrorCode::RecaptchaNeeded => "请完成验证",
            ApiErrorCode::RecaptchaFailed => "验证失败，请刷新页面重试",
            ApiErrorCode::NoMoreNewUsers => "未持有cookie的匿名用户无法发言",
            ApiErrorCode::MessageTooShort => "正文内容过短",
            ApiErrorCode::TopicLocked => "主题已被锁定",
            ApiErrorCode::ImageUploadFailed => "图片上传失败",
            ApiErrorCode::ImageUploadDisabled => "禁止上传图片",
            ApiErrorCode::ImageInvalidFormat => "图片格式不支持",
            ApiErrorCode::ImageDiskError => "图片上传失败",
            ApiErrorCode::Unknown(_) => return None,
        };
        Some(text)
    }
}

impl From<String> for ApiErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "bad-request" => ApiErrorCode::BadRequest,
            "internal-error" => ApiErrorCode::InternalError,
            "recaptcha-needed" => ApiErrorCode::RecaptchaNeeded,
            "recaptcha-failed" => ApiErrorCode::RecaptchaFailed,
            "no-more-new-users" => ApiErrorCode::NoMoreNewUsers,
            "message-too-short" => ApiErrorCode::MessageTooShort,
            "topic-locked" => ApiErrorCode::TopicLocked,
            "image-upload-failed" => ApiErrorCode::ImageUploadFailed,
            "image-upload-disabled" => ApiErrorCode::ImageUploadDisabled,
            "image-invalid-format" => ApiErrorCode::ImageInvalidFormat,
            "image-disk-error" => ApiErrorCode::ImageDiskError,
            _ => ApiErrorCode::Unknown(code),
        }
    }
}

impl From<ApiErrorCode> for String {
    fn from(code: ApiErrorCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
