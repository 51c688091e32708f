//! Registration flow integration tests
//!
//! Drive the events view, my-events view and registration widgets against a
//! mock backend.

mod helpers;

use chrono::Utc;

use EventHub::{
    handlers::{
        handle_create_event, ChangeOutcome, EventForm, EventsView, MyEventsView, RegistrationState,
        RegistrationStatus,
    },
    models::Role,
    services::NotificationKind,
    services::notification::drain,
};
use helpers::*;

#[tokio::test]
async fn test_widget_registered_iff_event_in_user_events() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (app, _token) = ctx.signed_in_app(&user);

    ctx.mock
        .mock_events(vec![
            event_json(1, 9, days_from_now(1)),
            event_json(2, 9, days_from_now(2)),
            event_json(3, 9, days_from_now(3)),
        ])
        .await;
    ctx.mock
        .mock_user_events(vec![
            registered_event_json(1, 9, days_from_now(1)),
            registered_event_json(3, 9, days_from_now(3)),
        ])
        .await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    assert!(view.refresh(&app.api, &app.notifications, now).await);

    let states: Vec<_> = view.cards(now).iter().map(|card| (card.event.event_id, card.status.state())).collect();
    assert_eq!(
        states,
        vec![
            (1, RegistrationState::Registered),
            (2, RegistrationState::NotRegistered),
            (3, RegistrationState::Registered),
        ]
    );

    // A standalone widget reaches the same answer with its own fetch.
    let mut standalone = RegistrationStatus::new(3, app.user());
    assert!(standalone.check(&app.api).await);
    assert!(standalone.is_registered());
    let mut other = RegistrationStatus::new(2, app.user());
    assert!(other.check(&app.api).await);
    assert_eq!(other.state(), RegistrationState::NotRegistered);
}

#[tokio::test]
async fn test_no_registrations_every_card_renders_register() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (app, _token) = ctx.signed_in_app(&user);

    ctx.mock
        .mock_events(vec![event_json(1, 9, days_from_now(1)), event_json(2, 9, days_from_now(5))])
        .await;
    ctx.mock.mock_user_events(Vec::new()).await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    view.refresh(&app.api, &app.notifications, now).await;

    let cards = view.cards(now);
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|card| card.status.render() == "Register"));
    assert!(view.index().is_empty());
}

#[tokio::test]
async fn test_register_then_my_events_lists_event() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (app, _token) = ctx.signed_in_app(&user);
    let mut rx = app.notifications.subscribe();
    let date = days_from_now(4);

    ctx.mock.mock_events(vec![event_json(42, 9, date)]).await;
    ctx.mock
        .mock_user_events_sequence(vec![Vec::new(), vec![registered_event_json(42, 9, date)]])
        .await;
    ctx.mock
        .mock_register_event(42, 201, "Successfully registered for event", 1)
        .await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    view.refresh(&app.api, &app.notifications, now).await;
    assert_eq!(view.widget(42).map(|w| w.state()), Some(RegistrationState::NotRegistered));

    let outcome = view.handle_register(42, &app.api, &app.notifications, now).await;
    assert_eq!(outcome, ChangeOutcome::Changed);
    assert_eq!(view.widget(42).map(|w| w.state()), Some(RegistrationState::Registered));
    assert!(view.index().contains(42));

    let received = drain(&mut rx);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].kind, NotificationKind::Success);
    assert_eq!(received[0].message, "Successfully registered for event!");

    let mut my_events = MyEventsView::new(&user);
    my_events.refresh(&app.api, &app.notifications, now).await;
    assert_eq!(my_events.registered().iter().map(|e| e.event_id).collect::<Vec<_>>(), vec![42]);
    assert!(my_events.can_unregister(42));
}

#[tokio::test]
async fn test_unregister_server_error_keeps_registered() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (app, _token) = ctx.signed_in_app(&user);
    let mut rx = app.notifications.subscribe();
    let date = days_from_now(4);

    ctx.mock.mock_events(vec![event_json(42, 9, date)]).await;
    ctx.mock.mock_user_events(vec![registered_event_json(42, 9, date)]).await;
    ctx.mock
        .mock_unregister_event(42, 500, "Database error: connection lost", 1)
        .await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    view.refresh(&app.api, &app.notifications, now).await;

    let outcome = view.handle_unregister(42, &app.api, &app.notifications, now).await;
    assert_eq!(outcome, ChangeOutcome::Failed);
    let widget = view.widget(42).unwrap();
    assert_eq!(widget.state(), RegistrationState::Registered);
    assert!(!widget.is_busy());

    let received = drain(&mut rx);
    assert_eq!(received[0].kind, NotificationKind::Error);
    assert_eq!(received[0].message, "Database error: connection lost");
}

#[tokio::test]
async fn test_unregister_from_my_events_refetches() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (app, _token) = ctx.signed_in_app(&user);
    let mut rx = app.notifications.subscribe();
    let date = days_from_now(2);

    ctx.mock.mock_events(vec![event_json(7, 9, date)]).await;
    ctx.mock
        .mock_user_events_sequence(vec![vec![registered_event_json(7, 9, date)], Vec::new()])
        .await;
    ctx.mock.mock_unregister_event(7, 200, "Successfully unregistered from event", 1).await;

    let now = Utc::now();
    let mut view = MyEventsView::new(&user);
    view.refresh(&app.api, &app.notifications, now).await;
    assert_eq!(view.counts(), (1, 0));

    let outcome = view.handle_unregister(7, &app.api, &app.notifications, now).await;
    assert_eq!(outcome, ChangeOutcome::Changed);
    assert_eq!(view.counts(), (0, 0));
    assert_eq!(drain_messages(&mut rx), vec!["Successfully unregistered from event".to_string()]);
}

#[tokio::test]
async fn test_register_conflict_reconciles_belief() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (app, _token) = ctx.signed_in_app(&user);
    let date = days_from_now(4);

    ctx.mock.mock_events(vec![event_json(5, 9, date)]).await;
    ctx.mock
        .mock_user_events_sequence(vec![Vec::new(), vec![registered_event_json(5, 9, date)]])
        .await;
    ctx.mock
        .mock_register_event(5, 409, "Already registered for this event", 1)
        .await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    view.refresh(&app.api, &app.notifications, now).await;

    let outcome = view.handle_register(5, &app.api, &app.notifications, now).await;
    assert_eq!(outcome, ChangeOutcome::Reconciled);
    assert!(view.widget(5).unwrap().is_registered());
}

#[tokio::test]
async fn test_register_signed_out_prompts_login_without_request() {
    let ctx = TestContext::new().await;
    let app = ctx.app();
    let mut rx = app.notifications.subscribe();

    ctx.mock.mock_events(vec![event_json(42, 9, days_from_now(1))]).await;
    ctx.mock.mock_register_event(42, 201, "unused", 0).await;

    let now = Utc::now();
    let mut view = EventsView::new(None);
    view.refresh(&app.api, &app.notifications, now).await;
    assert_eq!(view.widget(42).unwrap().state(), RegistrationState::NotAuthenticated);

    let outcome = view.handle_register(42, &app.api, &app.notifications, now).await;
    assert_eq!(outcome, ChangeOutcome::Ignored);

    let received = drain(&mut rx);
    assert_eq!(received[0].kind, NotificationKind::Warning);
    assert_eq!(received[0].message, "Please login to register for events");
}

#[tokio::test]
async fn test_action_after_failed_load_only_reports_the_load_failure() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (mut app, _token) = ctx.signed_in_app(&user);
    let mut rx = app.notifications.subscribe();

    ctx.mock.mock_unauthorized("GET", "/api/events", "Token has expired").await;
    ctx.mock.mock_user_events(Vec::new()).await;
    ctx.mock.mock_register_event(42, 201, "unused", 0).await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    view.refresh(&app.api, &app.notifications, now).await;

    let outcome = view.handle_register(42, &app.api, &app.notifications, now).await;
    assert_eq!(outcome, ChangeOutcome::Ignored);
    assert_eq!(drain_messages(&mut rx), vec!["Token has expired".to_string()]);

    assert_eq!(app.process_session_events().unwrap(), 1);
    assert_eq!(app.route(), EventHub::Route::Login);
}

#[tokio::test]
async fn test_unknown_event_is_notified() {
    let ctx = TestContext::new().await;
    let app = ctx.app();
    let mut rx = app.notifications.subscribe();
    ctx.mock.mock_events(vec![event_json(1, 9, days_from_now(1))]).await;

    let now = Utc::now();
    let mut view = EventsView::new(None);
    view.refresh(&app.api, &app.notifications, now).await;

    assert_eq!(
        view.handle_register(404, &app.api, &app.notifications, now).await,
        ChangeOutcome::Ignored
    );
    let received = drain(&mut rx);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].kind, NotificationKind::Error);
    assert_eq!(received[0].message, "Event #404 not found");
}

#[tokio::test]
async fn test_register_for_ended_event_is_refused_with_warning() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (app, _token) = ctx.signed_in_app(&user);
    let mut rx = app.notifications.subscribe();

    ctx.mock.mock_events(vec![event_json(6, 9, days_from_now(-2))]).await;
    ctx.mock.mock_user_events(Vec::new()).await;
    ctx.mock.mock_register_event(6, 201, "unused", 0).await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    view.refresh(&app.api, &app.notifications, now).await;
    assert_eq!(view.widget(6).unwrap().render(), "Event Ended");

    let outcome = view.handle_register(6, &app.api, &app.notifications, now).await;
    assert_eq!(outcome, ChangeOutcome::Ignored);
    let received = drain(&mut rx);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].kind, NotificationKind::Warning);
    assert_eq!(received[0].message, "This event has already ended");
}

#[tokio::test]
async fn test_past_event_creation_rejected_without_request() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (mut app, _token) = ctx.signed_in_app(&user);
    let mut rx = app.notifications.subscribe();

    ctx.mock.mock_create_event(201, "Event created successfully", 0).await;

    let now = Utc::now();
    let form = EventForm::new("Retro night").with_event_date(Some(days_from_now(-1)));
    assert!(!handle_create_event(&mut app, &form, now).await);
    assert_eq!(drain_messages(&mut rx), vec!["Event date cannot be in the past".to_string()]);
}

#[tokio::test]
async fn test_create_event_routes_to_events() {
    let ctx = TestContext::new().await;
    let user = create_test_user(1, Role::Participant);
    let (mut app, _token) = ctx.signed_in_app(&user);
    let mut rx = app.notifications.subscribe();

    ctx.mock.mock_create_event(201, "Event created successfully", 1).await;

    let form = EventForm::new("Rust meetup")
        .with_location("Room 4")
        .with_event_date(Some(days_from_now(10)));
    assert!(handle_create_event(&mut app, &form, Utc::now()).await);
    assert_eq!(app.route(), EventHub::Route::Events);
    assert_eq!(drain_messages(&mut rx), vec!["Event created successfully!".to_string()]);
}

#[tokio::test]
async fn test_delete_only_for_creator_or_admin() {
    let ctx = TestContext::new().await;
    let outsider = create_test_user(2, Role::Participant);
    let (app, _token) = ctx.signed_in_app(&outsider);
    let mut rx = app.notifications.subscribe();

    ctx.mock.mock_events(vec![event_json(8, 5, days_from_now(3))]).await;
    ctx.mock.mock_user_events(Vec::new()).await;
    ctx.mock.mock_delete_event(8, 200, "Event deleted successfully", 0).await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    view.refresh(&app.api, &app.notifications, now).await;
    assert!(!view.cards(now)[0].can_delete);

    assert!(!view.handle_delete(8, &app.api, &app.notifications, now).await);
    assert_eq!(
        drain_messages(&mut rx),
        vec!["Only the event creator or an admin can delete this event".to_string()]
    );
}

#[tokio::test]
async fn test_admin_deletes_event_and_refetches() {
    let ctx = TestContext::new().await;
    let admin = create_test_user(3, Role::Admin);
    let (app, _token) = ctx.signed_in_app(&admin);
    let mut rx = app.notifications.subscribe();

    ctx.mock.mock_events(vec![event_json(8, 5, days_from_now(3))]).await;
    ctx.mock.mock_user_events(Vec::new()).await;
    ctx.mock.mock_delete_event(8, 200, "Event deleted successfully", 1).await;

    let now = Utc::now();
    let mut view = EventsView::new(app.user());
    view.refresh(&app.api, &app.notifications, now).await;
    assert!(view.cards(now)[0].can_delete);

    assert!(view.handle_delete(8, &app.api, &app.notifications, now).await);
    assert_eq!(drain_messages(&mut rx), vec!["Event deleted successfully".to_string()]);
}

#[tokio::test]
async fn test_events_load_failure_keeps_previous_list() {
    let ctx = TestContext::new().await;
    let app = ctx.app();
    let mut rx = app.notifications.subscribe();

    let now = Utc::now();
    let mut view = EventsView::new(None);
    // Nothing mounted: the mock server answers 404 without a message.
    assert!(view.refresh(&app.api, &app.notifications, now).await);
    assert!(view.events().is_empty());
    assert!(!view.is_loaded());
    assert_eq!(drain_messages(&mut rx), vec!["Failed to load events".to_string()]);
}
