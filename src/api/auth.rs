use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{oauth::Service, server::AppState, warning};

pub async fn spotify_auth(State(state): State<AppState>) -> Response {
    redirect_to_consent(&state, Service::Spotify).await
}

pub async fn youtube_auth(State(state): State<AppState>) -> Response {
    redirect_to_consent(&state, Service::YouTube).await
}

pub async fn spotify_callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    callback(&state, Service::Spotify, &params).await
}

pub async fn youtube_callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    callback(&state, Service::YouTube, &params).await
}

async fn redirect_to_consent(state: &AppState, service: Service) -> Response {
    match state.begin_auth(service).await {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn callback(
    state: &AppState,
    service: Service,
    params: &HashMap<String, String>,
) -> Html<String> {
    if let Some(error) = params.get("error") {
        return failure_page(service, error);
    }
    let Some(code) = params.get("code") else {
        return failure_page(service, "no_code");
    };
    let Some(auth_state) = params.get("state") else {
        return failure_page(service, "missing state");
    };

    match state.complete_auth(service, auth_state, code).await {
        Ok(()) => Html(format!(
            "<h2>{service} connected.</h2><p>You can close this browser window.</p>"
        )),
        Err(e) => {
            warning!("{} sign-in failed: {}", service, e);
            failure_page(service, &e.to_string())
        }
    }
}

fn failure_page(service: Service, reason: &str) -> Html<String> {
    Html(format!(
        "<h4>{service} login failed.</h4><p>{}</p>",
        escape(reason)
    ))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
