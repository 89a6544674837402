use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::Actor;
use crate::database::models::{Conversation, Message, NewConversation, NewMessage};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::handlers::views::{self, Thread};
use crate::handlers::{missing, present, ListQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::ownership::{Action, Authorized};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartConversationRequest {
    pub property_id: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub body: Option<String>,
}

/// GET /agent/conversations, GET /user/conversations
pub async fn conversation_list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Conversation>> {
    let scope = state.resolver().scope(&actor).await?;
    let Some(filter) = scope.owned_filter() else {
        return Ok(ApiResponse::success(Vec::new()));
    };

    let conversations = state
        .store()
        .list_conversations(filter.recent(query.history_limit(&state.config)))
        .await?;
    Ok(ApiResponse::success(conversations))
}

/// GET /agent/conversations/:id, GET /user/conversations/:id - with messages
pub async fn conversation_get(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Thread> {
    let store = state.store();
    let Authorized { resource, .. } = state
        .resolver()
        .authorize(&actor, Action::Read, store.find_conversation(id).await?)
        .await?;

    Ok(ApiResponse::success(views::thread(store, resource).await?))
}

/// POST /user/conversations - open a thread with the listing agent
pub async fn conversation_create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(body): ApiJson<StartConversationRequest>,
) -> ApiResult<Thread> {
    let message = present(body.message);
    let (Some(property_id), Some(message)) = (body.property_id, message.clone()) else {
        let absent = missing(&[("property_id", body.property_id.is_none()), ("message", message.is_none())]);
        return Err(ApiError::missing_fields(&absent));
    };

    let store = state.store();
    let property = store
        .find_property(property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    let conversation = store
        .insert_conversation(NewConversation {
            user_id: actor.subject_id,
            agent_profile_id: property.agent_profile_id,
            property_id: property.id,
        })
        .await?;
    store
        .insert_message(NewMessage {
            conversation_id: conversation.id,
            sender_id: actor.subject_id,
            body: message,
        })
        .await?;

    info!(conversation_id = conversation.id, property_id, "Conversation started");
    Ok(ApiResponse::created(views::thread(store, conversation).await?))
}

/// POST /agent/conversations/:id/messages, POST /user/conversations/:id/messages
pub async fn message_create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<MessageRequest>,
) -> ApiResult<Message> {
    let store = state.store();
    let Authorized { resource, .. } = state
        .resolver()
        .authorize(&actor, Action::Update, store.find_conversation(id).await?)
        .await?;

    let body = present(body.body).ok_or_else(|| ApiError::missing_fields(&["body"]))?;

    let message = store
        .insert_message(NewMessage {
            conversation_id: resource.id,
            sender_id: actor.subject_id,
            body,
        })
        .await?;
    Ok(ApiResponse::created(message))
}
