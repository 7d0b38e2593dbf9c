//! Call-control webhook binding
//!
//! Telephony integration over half-duplex webhooks: the carrier posts
//! call events, each handler answers with a directive list
//! (`twiml::VoiceResponse`). The caller is either speaking (gather) or
//! listening (say); a silent gather redirects to voicemail.

use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use receptionist_agent::messages;

use crate::state::AppState;
use crate::twiml::VoiceResponse;

const PROCESS_SPEECH_URL: &str = "/api/process_speech";
const VOICEMAIL_URL: &str = "/api/voicemail";

/// Where a call sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Call answered, greeting being played
    Greeting,
    /// Waiting for caller speech
    Gathering,
    /// Caller spoke; a reply is being produced and played
    Responding,
    /// Terminal: silence exhausted the gather, voicemail plays
    Voicemail,
    /// Terminal: call over
    Ended,
}

/// Events that move a call between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    GreetingPlayed,
    CallerSpoke,
    ReplyPlayed,
    Farewell,
    GatherTimeout,
    Hangup,
}

impl CallState {
    /// Advance the state machine; terminal states absorb everything
    /// except that voicemail still ends.
    pub fn next(self, event: CallEvent) -> CallState {
        use CallEvent::*;
        use CallState::*;

        match (self, event) {
            (_, Hangup) => Ended,
            (Greeting, GreetingPlayed) => Gathering,
            (Gathering, CallerSpoke) => Responding,
            (Gathering, GatherTimeout) => Voicemail,
            (Responding, ReplyPlayed) => Gathering,
            (Responding, Farewell) => Ended,
            (Voicemail, _) => Ended,
            (Ended, _) => Ended,
            (state, event) => {
                tracing::warn!(?state, ?event, "Unexpected call event, state unchanged");
                state
            }
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Voicemail | CallState::Ended)
    }
}

/// Inbound call webhook payload (carrier form encoding)
#[derive(Debug, Deserialize)]
pub struct CallForm {
    #[serde(rename = "CallSid")]
    pub call_sid: String,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: String,
}

fn xml_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

/// POST /api/voice - incoming call
pub async fn handle_voice(State(state): State<AppState>, Form(form): Form<CallForm>) -> Response {
    tracing::info!(
        call_sid = %form.call_sid,
        from = form.from.as_deref().unwrap_or("unknown"),
        "Incoming call"
    );

    let roster = state.roster_snapshot().await;
    state.sessions.get_or_create(&form.call_sid, roster);
    state.calls.insert(
        form.call_sid.clone(),
        CallState::Greeting.next(CallEvent::GreetingPlayed),
    );

    let telephony = &state.settings.telephony;
    let response = VoiceResponse::new()
        .say(messages::GREETING, &telephony.language)
        .gather(
            &telephony.language,
            PROCESS_SPEECH_URL,
            telephony.gather_timeout_secs,
        )
        .redirect(VOICEMAIL_URL);

    xml_response(response.to_xml())
}

/// POST /api/process_speech - caller speech transcription
pub async fn handle_process_speech(
    State(state): State<AppState>,
    Form(form): Form<CallForm>,
) -> Response {
    let telephony = state.settings.telephony.clone();

    let processor = match state.processor() {
        Some(processor) => processor,
        None => {
            tracing::error!(call_sid = %form.call_sid, "No dialogue model bound, ending call");
            let response = VoiceResponse::new()
                .say(messages::SERVICE_UNAVAILABLE, &telephony.language)
                .hangup();
            return xml_response(response.to_xml());
        }
    };

    if let Some(mut entry) = state.calls.get_mut(&form.call_sid) {
        *entry = entry.next(CallEvent::CallerSpoke);
    }

    tracing::debug!(
        call_sid = %form.call_sid,
        utterance = %form.speech_result,
        "Caller speech received"
    );

    let roster = state.roster_snapshot().await;
    let session = state.sessions.get_or_create(&form.call_sid, roster);
    let mut session = session.lock().await;

    let result = processor.process(&mut session, &form.speech_result).await;
    state.evaluate_commit(&mut session, &result).await;
    drop(session);

    let response = if result.should_continue {
        if let Some(mut entry) = state.calls.get_mut(&form.call_sid) {
            *entry = entry.next(CallEvent::ReplyPlayed);
        }
        VoiceResponse::new()
            .say(&result.spoken_text, &telephony.language)
            .gather(
                &telephony.language,
                PROCESS_SPEECH_URL,
                telephony.gather_timeout_secs,
            )
            .redirect(VOICEMAIL_URL)
    } else {
        if let Some(mut entry) = state.calls.get_mut(&form.call_sid) {
            *entry = entry.next(CallEvent::Farewell);
        }
        state.sessions.remove(&form.call_sid).await;
        state.calls.remove(&form.call_sid);
        VoiceResponse::new()
            .say(&result.spoken_text, &telephony.language)
            .say(messages::GOODBYE, &telephony.language)
            .hangup()
    };

    xml_response(response.to_xml())
}

/// Carrier lifecycle callback payload
#[derive(Debug, Deserialize)]
pub struct CallStatusForm {
    #[serde(rename = "CallSid")]
    pub call_sid: String,
    #[serde(rename = "CallStatus", default)]
    pub call_status: String,
}

/// Statuses after which the carrier sends no further webhooks
const FINAL_CALL_STATUSES: &[&str] = &["completed", "busy", "failed", "no-answer", "canceled"];

/// POST /api/call_status - carrier call lifecycle callback
///
/// A caller who hangs up mid-gather never triggers the action webhook
/// again; this callback is where those sessions get released.
pub async fn handle_call_status(
    State(state): State<AppState>,
    Form(form): Form<CallStatusForm>,
) -> StatusCode {
    if !FINAL_CALL_STATUSES.contains(&form.call_status.as_str()) {
        return StatusCode::NO_CONTENT;
    }

    if let Some(mut entry) = state.calls.get_mut(&form.call_sid) {
        *entry = entry.next(CallEvent::Hangup);
    }
    state.calls.remove(&form.call_sid);
    state.sessions.remove(&form.call_sid).await;

    tracing::info!(
        call_sid = %form.call_sid,
        status = %form.call_status,
        "Call finished, session released"
    );

    StatusCode::NO_CONTENT
}

/// POST /api/voicemail - gather timed out without speech
pub async fn handle_voicemail(
    State(state): State<AppState>,
    Form(form): Form<CallForm>,
) -> Response {
    tracing::info!(call_sid = %form.call_sid, "Gather timed out, playing voicemail");

    if let Some(mut entry) = state.calls.get_mut(&form.call_sid) {
        *entry = entry.next(CallEvent::GatherTimeout);
    }
    state.sessions.remove(&form.call_sid).await;
    state.calls.remove(&form.call_sid);

    let response = VoiceResponse::new()
        .say(messages::VOICEMAIL, &state.settings.telephony.language)
        .hangup();

    xml_response(response.to_xml())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use receptionist_config::Settings;
    use receptionist_persistence::PersistenceLayer;
    use std::sync::Arc;

    struct SilentSpeech;

    #[async_trait]
    impl receptionist_core::SpeechSynthesizer for SilentSpeech {
        async fn synthesize(
            &self,
            _text: &str,
            _language: &str,
        ) -> receptionist_core::Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn backend_name(&self) -> &str {
            "silent"
        }
    }

    fn test_state() -> AppState {
        AppState::new(
            Settings::default(),
            None,
            Arc::new(SilentSpeech),
            PersistenceLayer::in_memory(),
        )
    }

    #[tokio::test]
    async fn test_final_call_status_releases_session() {
        let state = test_state();
        state.sessions.create("CA123", vec![]);
        state.calls.insert("CA123".to_string(), CallState::Gathering);

        let status = handle_call_status(
            State(state.clone()),
            Form(CallStatusForm {
                call_sid: "CA123".to_string(),
                call_status: "completed".to_string(),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.sessions.get("CA123").is_none());
        assert!(!state.calls.contains_key("CA123"));
    }

    #[tokio::test]
    async fn test_in_progress_status_keeps_session() {
        let state = test_state();
        state.sessions.create("CA123", vec![]);
        state.calls.insert("CA123".to_string(), CallState::Gathering);

        handle_call_status(
            State(state.clone()),
            Form(CallStatusForm {
                call_sid: "CA123".to_string(),
                call_status: "in-progress".to_string(),
            }),
        )
        .await;

        assert!(state.sessions.get("CA123").is_some());
        assert!(state.calls.contains_key("CA123"));
    }

    #[test]
    fn test_happy_path_transitions() {
        let state = CallState::Greeting
            .next(CallEvent::GreetingPlayed)
            .next(CallEvent::CallerSpoke)
            .next(CallEvent::ReplyPlayed)
            .next(CallEvent::CallerSpoke)
            .next(CallEvent::Farewell);
        assert_eq!(state, CallState::Ended);
    }

    #[test]
    fn test_timeout_goes_to_voicemail() {
        let state = CallState::Gathering.next(CallEvent::GatherTimeout);
        assert_eq!(state, CallState::Voicemail);
        assert!(state.is_terminal());
        assert_eq!(state.next(CallEvent::ReplyPlayed), CallState::Ended);
    }

    #[test]
    fn test_hangup_terminal_from_anywhere() {
        for state in [
            CallState::Greeting,
            CallState::Gathering,
            CallState::Responding,
            CallState::Voicemail,
        ] {
            assert_eq!(state.next(CallEvent::Hangup), CallState::Ended);
        }
    }

    #[test]
    fn test_unexpected_event_leaves_state() {
        assert_eq!(
            CallState::Gathering.next(CallEvent::GreetingPlayed),
            CallState::Gathering
        );
    }

    #[test]
    fn test_ended_absorbs_everything() {
        assert_eq!(
            CallState::Ended.next(CallEvent::CallerSpoke),
            CallState::Ended
        );
    }
}
