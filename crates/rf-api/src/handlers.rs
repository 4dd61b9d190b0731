//! # rf-api Handlers
//!
//! Each handler validates the request, hands it to [`ForumService`] and
//! serializes the resolved view. The thread kind comes from the scope the
//! route was registered under, never from user input.

use actix_web::{web, HttpResponse};
use rf_core::{ForumService, NewThread, ThreadFilter, ThreadKind, UserId};
use serde::Deserialize;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::validation;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub service: ForumService,
}

type State = web::Data<AppState>;
type Kind = web::Data<ThreadKind>;
type Reply = Result<HttpResponse, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub author: Option<String>,
    /// Comma separated; a thread matches if it carries any of them.
    pub tags: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
    #[serde(default)]
    pub text: String,
}

// -- Listing --

pub async fn list_threads(state: State, kind: Kind, query: web::Query<ListQuery>) -> Reply {
    let query = query.into_inner();
    let author = query.author.as_deref().map(UserId::parse).transpose()?;
    let tags = query.tags.as_deref().unwrap_or_default().split(',');
    let filter = ThreadFilter { author, ..ThreadFilter::default() }.with_tags(tags);
    let page = state.service.page_request(query.page, query.limit);

    let page = state.service.list_threads(**kind, &filter, page).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn list_by_username(
    state: State,
    kind: Kind,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Reply {
    let page = state.service.page_request(query.page, query.limit);
    let page = state
        .service
        .list_threads_by_username(**kind, &username, page)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

// -- Thread lifecycle --

pub async fn create_thread(state: State, kind: Kind, user: Identity, body: web::Json<NewThread>) -> Reply {
    let fields = validation::new_thread(body.into_inner())?;
    let view = state.service.create_thread(**kind, user.0, fields).await?;
    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/api/{}/{}", kind.token(), view.id)))
        .json(view))
}

pub async fn show_thread(state: State, kind: Kind, id: web::Path<String>) -> Reply {
    let view = state.service.show_thread(**kind, &id).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn delete_thread(state: State, kind: Kind, _user: Identity, id: web::Path<String>) -> Reply {
    state.service.delete_thread(**kind, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

// -- Votes --

async fn cast_vote(state: State, kind: Kind, user: Identity, id: web::Path<String>, value: i64) -> Reply {
    let view = state.service.vote(**kind, &id, user.0, value).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn upvote(state: State, kind: Kind, user: Identity, id: web::Path<String>) -> Reply {
    cast_vote(state, kind, user, id, 1).await
}

pub async fn downvote(state: State, kind: Kind, user: Identity, id: web::Path<String>) -> Reply {
    cast_vote(state, kind, user, id, -1).await
}

pub async fn unvote(state: State, kind: Kind, user: Identity, id: web::Path<String>) -> Reply {
    cast_vote(state, kind, user, id, 0).await
}

// -- Comments --

pub async fn add_comment(
    state: State,
    kind: Kind,
    user: Identity,
    id: web::Path<String>,
    body: web::Json<CommentBody>,
) -> Reply {
    let body = validation::comment_body(&body.body)?;
    let view = state.service.add_comment(**kind, &id, user.0, &body).await?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn remove_comment(state: State, kind: Kind, _user: Identity, path: web::Path<(String, String)>) -> Reply {
    let (thread, comment) = path.into_inner();
    let view = state.service.remove_comment(**kind, &thread, &comment).await?;
    Ok(HttpResponse::Ok().json(view))
}

// -- Answers --

pub async fn add_answer(
    state: State,
    kind: Kind,
    user: Identity,
    id: web::Path<String>,
    body: web::Json<AnswerBody>,
) -> Reply {
    let text = validation::answer_text(&body.text)?;
    let view = state.service.add_answer(**kind, &id, user.0, &text).await?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn remove_answer(state: State, kind: Kind, _user: Identity, path: web::Path<(String, String)>) -> Reply {
    let (thread, answer) = path.into_inner();
    let view = state.service.remove_answer(**kind, &thread, &answer).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn add_answer_comment(
    state: State,
    kind: Kind,
    user: Identity,
    path: web::Path<(String, String)>,
    body: web::Json<CommentBody>,
) -> Reply {
    let (thread, answer) = path.into_inner();
    let body = validation::comment_body(&body.body)?;
    let view = state
        .service
        .add_answer_comment(**kind, &thread, &answer, user.0, &body)
        .await?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn remove_answer_comment(
    state: State,
    kind: Kind,
    _user: Identity,
    path: web::Path<(String, String, String)>,
) -> Reply {
    let (thread, answer, comment) = path.into_inner();
    let view = state
        .service
        .remove_answer_comment(**kind, &thread, &answer, &comment)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}
