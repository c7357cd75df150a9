mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;

use ragchat_types::QueryOptions;
use ragchat_ui::view::entry_html;
use ragchat_ui::{ConnectionStatus, LoadState, SendOutcome, ToastKind, TranscriptEntry};

// ============================================================================
// Startup
// ============================================================================

#[tokio::test]
async fn test_init_loads_status_and_sidebar() {
    let app = controller();
    let t = transport(&app);
    t.reply("/health", json!({"status": "healthy"}));
    t.reply(
        "/questions/examples",
        json!({"success": true, "examples": [{"category": "Basics", "questions": ["What is X?", "How to Y?"]}]}),
    );
    t.reply(
        "/modules",
        json!({"success": true, "modules": [{"name": "guide", "description": "User guide"}]}),
    );

    app.init().await;

    let surface = app.surface();
    assert_eq!(*surface.status.borrow(), Some(ConnectionStatus::healthy()));
    assert_eq!(surface.examples.borrow()[0].questions.len(), 2);
    assert_eq!(surface.modules.borrow()[0].name, "guide");

    assert!(app.pick_example(1));
    assert_eq!(*surface.input.borrow(), "How to Y?");
    assert!(app.pick_module(0));
    assert_eq!(*surface.input.borrow(), "What does document guide contain?");
    assert!(!app.pick_example(7));
}

#[tokio::test]
async fn test_health_states() {
    let app = controller();
    transport(&app).reply("/health", json!({"status": "degraded"}));
    let status = app.check_health().await;
    assert_eq!(status.assistant.label, "Offline");
    assert_eq!(status.store.label, "Error");

    let app = controller();
    transport(&app).fail("/health");
    let status = app.check_health().await;
    assert_eq!(status, ConnectionStatus::unreachable());
    assert_eq!(app.state().status, status);
    assert!(!status.assistant.online && !status.store.online);
}

#[tokio::test]
async fn test_sidebar_failures_are_silent() {
    let app = controller();
    transport(&app).fail("/questions/examples");
    transport(&app).reply("/modules", json!({"success": false, "message": "Indexer unavailable"}));
    app.load_examples().await;
    app.load_modules().await;
    assert!(app.surface().toasts.borrow().is_empty());
    assert!(app.state().modules.is_empty());
}

// ============================================================================
// Sending
// ============================================================================

#[tokio::test]
async fn test_successful_send() {
    let app = controller();
    transport(&app).reply("/query", answer_body());

    let outcome = app.send_message("  What is X?  ").await;
    assert_eq!(outcome, SendOutcome::Answered);

    let entries = app.surface().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], TranscriptEntry::user("What is X?"));
    let html = entry_html(&entries[1]);
    assert!(html.contains("<strong>X</strong>"));
    assert!(html.contains("2 sources"));
    assert!(html.contains("50 tokens"));
    assert!(html.contains("doc1.pdf — 92.0%"));

    let surface = app.surface();
    assert!(!surface.welcome.get());
    assert!(surface.input.borrow().is_empty());
    assert_eq!(*surface.loading_changes.borrow(), vec![true, false]);

    let state = app.state();
    assert_eq!(state.loading, LoadState::Idle);
    assert_eq!(state.turns.len(), 1);
    assert_eq!(state.turns[0].question, "What is X?");
    assert_eq!(state.turns[0].metadata.tokens_used, 50);
    assert_eq!(state.transcript.entries(), entries.as_slice());
}

#[tokio::test]
async fn test_request_body_follows_toggles() {
    let app = controller();
    transport(&app).reply("/query", answer_body());
    app.set_include_sources(false);
    app.set_include_conversation(false);

    app.send_message("What is X?").await;

    let calls = transport(&app).calls_to("/query");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        Some(json!({
            "question": "What is X?",
            "max_sources": 5,
            "include_conversation": false,
            "include_sources": false
        }))
    );
    // Citations are dropped when the toggle is off.
    match &app.surface().entries()[1] {
        TranscriptEntry::Assistant { sources, .. } => assert!(sources.is_empty()),
        other => panic!("expected assistant entry, got {:?}", other),
    }
    assert!(!entry_html(&app.surface().entries()[1]).contains("doc1.pdf"));
}

#[tokio::test]
async fn test_empty_question_is_ignored() {
    let app = controller();
    assert_eq!(app.send_message("   ").await, SendOutcome::Ignored);
    assert!(transport(&app).calls().is_empty());
    assert!(app.surface().entries().is_empty());
    assert!(app.surface().loading_changes.borrow().is_empty());
}

#[tokio::test]
async fn test_send_while_pending_is_ignored() {
    let app = controller();
    let t = transport(&app);
    t.reply("/query", answer_body());
    let release = t.hold("/query");

    let first = app.send_message("first");
    futures::pin_mut!(first);
    assert!(futures::poll!(&mut first).is_pending());
    assert_eq!(app.state().loading, LoadState::Pending);
    assert!(app.surface().loading.get());

    assert_eq!(app.send_message("second").await, SendOutcome::Ignored);
    assert_eq!(t.calls_to("/query").len(), 1);

    release.send(()).unwrap();
    assert_eq!(first.await, SendOutcome::Answered);
    assert_eq!(app.state().loading, LoadState::Idle);
    assert_eq!(app.surface().entries().len(), 2);
}

#[tokio::test]
async fn test_rejected_send() {
    let app = controller();
    transport(&app).reply("/query", json!({"success": false, "error": "Question vide"}));

    assert_eq!(app.send_message("q").await, SendOutcome::Failed);

    let entries = app.surface().entries();
    assert_eq!(
        entries,
        vec![
            TranscriptEntry::user("q"),
            TranscriptEntry::error("Error: Question vide")
        ]
    );
    assert!(!entries.iter().any(TranscriptEntry::is_assistant));
    assert_eq!(
        app.surface().toast_messages(),
        vec!["Error while processing the question"]
    );
    assert_eq!(app.surface().toasts.borrow()[0].kind, ToastKind::Error);
    assert!(app.turns().is_empty());
    assert_eq!(app.state().loading, LoadState::Idle);
}

#[tokio::test]
async fn test_network_failure_send() {
    let app = controller();
    transport(&app).fail("/query");

    assert_eq!(app.send_message("q").await, SendOutcome::Failed);

    assert_eq!(
        app.surface().entries(),
        vec![
            TranscriptEntry::user("q"),
            TranscriptEntry::error("Server connection error")
        ]
    );
    assert_eq!(app.surface().toast_messages(), vec!["Connection error"]);
    assert!(!app.surface().loading.get());
}

#[tokio::test]
async fn test_answer_after_clear_is_discarded() {
    let app = controller();
    let t = transport(&app);
    t.reply("/query", answer_body());
    t.reply("/conversation/clear", json!({"success": true}));
    let release = t.hold("/query");

    let send = app.send_message("q");
    futures::pin_mut!(send);
    assert!(futures::poll!(&mut send).is_pending());

    assert!(app.clear_conversation().await);
    release.send(()).unwrap();

    assert_eq!(send.await, SendOutcome::Stale);
    assert!(app.surface().entries().is_empty());
    assert!(app.turns().is_empty());
    assert!(app.surface().welcome.get());
    assert_eq!(app.state().loading, LoadState::Idle);
}

#[tokio::test]
async fn test_answer_after_new_conversation_is_discarded() {
    let app = controller();
    let t = transport(&app);
    t.reply("/query", answer_body());
    t.reply("/conversation/new", json!({"success": true, "new_session_id": "s7"}));
    let release = t.hold("/query");

    let send = app.send_message("q");
    futures::pin_mut!(send);
    assert!(futures::poll!(&mut send).is_pending());

    assert!(app.new_conversation().await);
    release.send(()).unwrap();

    assert_eq!(send.await, SendOutcome::Stale);
    assert!(app.surface().entries().is_empty());
    assert!(app.turns().is_empty());
    assert_eq!(app.state().session_id.as_deref(), Some("s7"));
    assert_eq!(app.state().loading, LoadState::Idle);
}

#[tokio::test]
async fn test_answer_after_session_load_is_discarded() {
    let app = controller();
    let t = transport(&app);
    t.reply("/query", answer_body());
    t.reply("/conversation/load", json!({"success": true}));
    t.reply("/conversation/history", history_body(2));
    let release = t.hold("/query");

    let send = app.send_message("q");
    futures::pin_mut!(send);
    assert!(futures::poll!(&mut send).is_pending());

    assert!(app.load_session("s2").await);
    release.send(()).unwrap();

    assert_eq!(send.await, SendOutcome::Stale);
    let entries = app.surface().entries();
    // Resume banner, two pairs, continuation banner.
    assert_eq!(entries.len(), 6);
    assert!(!entries.contains(&TranscriptEntry::user("q")));
    let turns = app.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].question, "q1");
    assert_eq!(app.state().loading, LoadState::Idle);
}

#[tokio::test]
async fn test_replay_after_clear_is_discarded() {
    let app = controller();
    let t = transport(&app);
    t.reply("/conversation/load", json!({"success": true}));
    t.reply("/conversation/history", history_body(2));
    t.reply("/conversation/clear", json!({"success": true}));
    let release = t.hold("/conversation/history");

    let load = app.load_session("s2");
    futures::pin_mut!(load);
    assert!(futures::poll!(&mut load).is_pending());

    assert!(app.clear_conversation().await);
    release.send(()).unwrap();
    assert!(load.await);

    assert!(app.surface().entries().is_empty());
    assert!(app.turns().is_empty());
    assert!(app.surface().welcome.get());
}

// ============================================================================
// Resync
// ============================================================================

#[tokio::test]
async fn test_resync_replaces_turns() {
    let app = controller();
    transport(&app).reply("/conversation/history", history_body(3));

    assert!(app.resync_history().await);

    let turns = app.turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2].metadata.tokens_used, 12);
    assert_eq!(turns[0].metadata.model, "codestral-latest");
    // The transcript is untouched.
    assert!(app.surface().entries().is_empty());
}

#[tokio::test]
async fn test_resync_keeps_method_and_context_flag() {
    let app = controller();
    transport(&app).reply(
        "/conversation/history",
        json!({"success": true, "history": [
            {"question": "What is X?", "response": "X is...", "method": "rag", "context_reference": false},
            {"question": "And its limits?", "response": "Few.", "method": "contextual_rag", "context_reference": true}
        ]}),
    );

    assert!(app.resync_history().await);

    let turns = app.turns();
    assert_eq!(turns[0].metadata.method.as_deref(), Some("rag"));
    assert!(!turns[0].metadata.context_reference);
    assert_eq!(turns[1].metadata.method.as_deref(), Some("contextual_rag"));
    assert!(turns[1].metadata.context_reference);
}

#[tokio::test]
async fn test_resync_after_clear_is_discarded() {
    let app = controller();
    let t = transport(&app);
    t.reply("/conversation/history", history_body(3));
    t.reply("/conversation/clear", json!({"success": true}));
    let release = t.hold("/conversation/history");

    let resync = app.resync_history();
    futures::pin_mut!(resync);
    assert!(futures::poll!(&mut resync).is_pending());

    assert!(app.clear_conversation().await);
    release.send(()).unwrap();

    assert!(!resync.await);
    assert!(app.turns().is_empty());
}

#[tokio::test]
async fn test_resync_failure_is_silent() {
    let app = controller();
    transport(&app).fail("/conversation/history");
    assert!(!app.resync_history().await);
    assert!(app.surface().toasts.borrow().is_empty());
}

// ============================================================================
// Dialogs
// ============================================================================

#[tokio::test]
async fn test_statistics_open_only_on_success() {
    let app = controller();
    transport(&app).reply(
        "/stats",
        json!({"success": true, "statistics": {"conversation": {"total_interactions": 2, "total_tokens_used": 90, "average_tokens_per_interaction": 45.0}}}),
    );
    assert!(app.show_statistics().await);
    let stats = app.surface().stats.borrow().clone().unwrap();
    assert_eq!(stats.conversation.unwrap().total_tokens_used, 90);

    let app = controller();
    transport(&app).reply("/stats", json!({"success": false, "error": "boom"}));
    assert!(!app.show_statistics().await);
    assert!(app.surface().stats.borrow().is_none());
    assert_eq!(app.surface().toast_messages(), vec!["Error while loading statistics"]);
}

#[tokio::test]
async fn test_history_view_lists_sessions() {
    let app = controller();
    transport(&app).reply(
        "/conversation/sessions",
        json!({"success": true, "sessions": [{"session_id": "s1", "is_current": true}, {"session_id": "s2"}]}),
    );
    assert!(app.show_history().await);
    assert_eq!(app.surface().sessions.borrow().as_ref().map(Vec::len), Some(2));
    assert_eq!(app.state().sessions[1].session_id, "s2");
}

#[tokio::test]
async fn test_history_view_connection_error() {
    let app = controller();
    transport(&app).fail("/conversation/sessions");
    assert!(!app.show_history().await);
    assert!(app.surface().sessions.borrow().is_none());
    assert_eq!(app.surface().toast_messages(), vec!["Connection error"]);
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_load_session_replays_history() {
    let app = controller();
    let t = transport(&app);
    t.reply("/conversation/load", json!({"success": true, "session_id": "s2"}));
    t.reply("/conversation/history", history_body(2));

    assert!(app.load_session("s2").await);

    assert_eq!(
        t.calls_to("/conversation/load")[0].body,
        Some(json!({"session_id": "s2"}))
    );
    let entries = app.surface().entries();
    assert_eq!(entries.len(), 6);
    assert_eq!(
        entries[0],
        TranscriptEntry::ResumeBanner {
            session_id: "s2".to_string(),
            turns: 2
        }
    );
    assert_eq!(entries[1], TranscriptEntry::user("q0"));
    match &entries[2] {
        TranscriptEntry::Assistant { markdown, metadata, .. } => {
            assert_eq!(markdown, "r0");
            let metadata = metadata.as_ref().unwrap();
            assert_eq!(metadata.tokens_used, 10);
            assert_eq!(metadata.model, "codestral-latest");
        }
        other => panic!("expected assistant entry, got {:?}", other),
    }
    assert_eq!(entries[3], TranscriptEntry::user("q1"));
    assert_eq!(entries[5], TranscriptEntry::ContinueBanner);

    let surface = app.surface();
    assert_eq!(surface.sessions_closed.get(), 1);
    assert!(!surface.welcome.get());
    assert_eq!(surface.toast_messages(), vec!["Session s2 loaded"]);
    assert_eq!(app.turns().len(), 2);
}

#[tokio::test]
async fn test_load_empty_session() {
    let app = controller();
    let t = transport(&app);
    t.reply("/query", answer_body());
    t.reply("/conversation/load", json!({"success": true}));
    t.reply("/conversation/history", json!({"success": true, "history": []}));
    app.send_message("q").await;

    assert!(app.load_session("s3").await);

    assert!(app.surface().entries().is_empty());
    assert!(app.surface().welcome.get());
    assert!(app.turns().is_empty());
    let toasts = app.surface().toasts.borrow().clone();
    assert_eq!(toasts.last().unwrap().message, "Session loaded (no conversation)");
    assert_eq!(toasts.last().unwrap().kind, ToastKind::Info);
}

#[tokio::test]
async fn test_declined_confirmation_sends_nothing() {
    let app = controller();
    app.surface().confirm_answer.set(false);

    assert!(!app.load_session("s1").await);
    assert!(!app.delete_session("s1").await);
    assert!(!app.clear_conversation().await);
    assert!(!app.new_conversation().await);

    assert!(transport(&app).calls().is_empty());
    assert_eq!(app.surface().prompts.borrow().len(), 4);
    assert!(app.surface().prompts.borrow()[0].contains("s1"));
}

#[tokio::test]
async fn test_load_failure_keeps_transcript() {
    let app = controller();
    let t = transport(&app);
    t.reply("/query", answer_body());
    t.reply("/conversation/load", json!({"success": false, "error": "Session s9 not found"}));
    app.send_message("q").await;

    assert!(!app.load_session("s9").await);

    assert_eq!(app.surface().entries().len(), 2);
    assert_eq!(app.surface().sessions_closed.get(), 0);
    assert_eq!(
        app.surface().toast_messages(),
        vec!["Error while loading the session"]
    );
    assert!(t.calls_to("/conversation/history").is_empty());
}

#[tokio::test]
async fn test_delete_session_refreshes_list() {
    let app = controller();
    let t = transport(&app);
    t.reply("/conversation/delete", json!({"success": true}));
    t.reply("/conversation/sessions", json!({"success": true, "sessions": []}));

    assert!(app.delete_session("s2").await);

    assert_eq!(
        t.calls_to("/conversation/delete")[0].body,
        Some(json!({"session_id": "s2"}))
    );
    assert_eq!(t.calls_to("/conversation/sessions").len(), 1);
    assert_eq!(app.surface().sessions.borrow().as_ref().map(Vec::len), Some(0));
    assert_eq!(app.surface().toast_messages(), vec!["Session s2 deleted"]);
}

#[tokio::test]
async fn test_delete_failure_only_notifies() {
    let app = controller();
    transport(&app).reply("/conversation/delete", json!({"success": false, "error": "nope"}));
    assert!(!app.delete_session("s2").await);
    assert!(transport(&app).calls_to("/conversation/sessions").is_empty());
    assert_eq!(
        app.surface().toast_messages(),
        vec!["Error while deleting the session"]
    );
}

#[tokio::test]
async fn test_clear_restores_welcome() {
    let app = controller();
    let t = transport(&app);
    t.reply("/query", answer_body());
    t.reply("/conversation/clear", json!({"success": true}));
    app.send_message("q").await;
    assert_eq!(app.surface().entries().len(), 2);

    assert!(app.clear_conversation().await);

    assert!(app.surface().entries().is_empty());
    assert!(app.surface().welcome.get());
    assert!(app.turns().is_empty());
    assert!(app.state().transcript.welcome_visible());
}

#[tokio::test]
async fn test_new_conversation_reports_id() {
    let app = controller();
    let t = transport(&app);
    t.reply("/query", answer_body());
    t.reply(
        "/conversation/new",
        json!({"success": true, "old_session_id": "s1", "new_session_id": "s2"}),
    );
    app.send_message("q").await;

    assert!(app.new_conversation().await);

    assert!(app.surface().entries().is_empty());
    assert!(app.surface().welcome.get());
    assert_eq!(
        app.surface().toast_messages().last().map(String::as_str),
        Some("New conversation started: s2")
    );
}

#[tokio::test]
async fn test_new_conversation_without_id() {
    let app = controller_with(QueryOptions::default());
    transport(&app).reply("/conversation/new", json!({"success": true}));
    assert!(app.new_conversation().await);
    assert_eq!(app.surface().toast_messages(), vec!["New conversation started"]);
}

#[tokio::test]
async fn test_search_renders_hits() {
    let app = controller();
    transport(&app).reply(
        "/search",
        json!({"success": true, "count": 1, "results": [{"content": "pip install", "source": "setup.md", "similarity": 0.8}]}),
    );
    assert!(app.search("install", 5).await);
    assert_eq!(app.surface().search_hits.borrow()[0].content, "pip install");
    assert!(!app.search("  ", 5).await);
    assert_eq!(transport(&app).calls_to("/search").len(), 1);
}

#[tokio::test]
async fn test_session_id_is_tracked() {
    let app = controller();
    let t = transport(&app);
    t.reply(
        "/conversation/sessions",
        json!({"success": true, "sessions": [{"session_id": "s0"}, {"session_id": "s1", "turns_count": 2, "is_current": true}]}),
    );
    t.reply("/conversation/new", json!({"success": true, "new_session_id": "s5"}));

    let current = app.current_session().await.unwrap();
    assert_eq!(current.session_id, "s1");
    assert_eq!(current.turns(), 2);
    assert_eq!(app.state().session_id.as_deref(), Some("s1"));

    app.new_conversation().await;
    assert_eq!(app.state().session_id.as_deref(), Some("s5"));
}
