//! Wire types for the subset of the Telegram Bot API the bot uses.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl User {
    /// `@username` when the user has one, otherwise the first name.
    pub fn display_name(&self) -> String {
        match self.username.as_deref().filter(|username| !username.is_empty()) {
            Some(username) => format!("@{username}"),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EditMessageTextRequest<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    pub parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::{ApiResponse, Update, User};

    #[test]
    fn display_name_prefers_username() {
        let mut user =
            User { id: 7, is_bot: false, first_name: "Ana".to_owned(), username: None };
        assert_eq!(user.display_name(), "Ana");

        user.username = Some("ana_spike".to_owned());
        assert_eq!(user.display_name(), "@ana_spike");

        user.username = Some(String::new());
        assert_eq!(user.display_name(), "Ana");
    }

    #[test]
    fn decodes_callback_update_from_bot_api_payload() {
        let raw = r#"{
            "ok": true,
            "result": [{
                "update_id": 901,
                "callback_query": {
                    "id": "cb-1",
                    "from": {"id": 11, "is_bot": false, "first_name": "Ben", "username": "benb"},
                    "message": {"message_id": 5, "chat": {"id": -1005040590820, "type": "supergroup"}},
                    "chat_instance": "x",
                    "data": "courtB"
                }
            }]
        }"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(raw).expect("decodes");
        let updates = response.result.expect("result present");
        let callback = updates[0].callback_query.as_ref().expect("callback");

        assert_eq!(updates[0].update_id, 901);
        assert_eq!(callback.data.as_deref(), Some("courtB"));
        assert_eq!(callback.from.display_name(), "@benb");
        assert_eq!(callback.message.as_ref().map(|message| message.chat.id), Some(-1005040590820));
    }

    #[test]
    fn decodes_error_response() {
        let raw = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(raw).expect("decodes");

        assert!(!response.ok);
        assert_eq!(response.error_code, Some(401));
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }
}
