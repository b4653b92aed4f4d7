// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{InMemoryRepos, RecordingEmail, RecordingWebhook};
use compwatch::domain::models::change::{ChangeRecord, Severity};
use compwatch::domain::models::notification::keys;
use compwatch::domain::models::target::Target;
use compwatch::domain::services::notification_service::{
    ChangeNotifier, ChannelOutcome, DispatchReport, NotificationDispatcher, NotificationError,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use uuid::Uuid;

const WEBHOOK_URL: &str = "https://hooks.acme.test/services/T000/B000";

fn target() -> Target {
    Target::new(
        "Acme".to_string(),
        "https://acme.test".to_string(),
        &["https://acme.test/pricing".to_string()],
    )
}

fn change(severity: Severity) -> ChangeRecord {
    ChangeRecord::new(
        Uuid::new_v4(),
        "https://acme.test/pricing".to_string(),
        "- Basic $10\n+ Basic $15",
        "Basic plan price increased".to_string(),
        severity,
    )
}

fn webhook_settings() -> Vec<(&'static str, &'static str)> {
    vec![(keys::WEBHOOK_ENABLED, "true"), (keys::WEBHOOK_URL, WEBHOOK_URL)]
}

fn email_settings() -> Vec<(&'static str, &'static str)> {
    vec![
        (keys::EMAIL_ENABLED, "true"),
        (keys::EMAIL_SMTP_HOST, "smtp.acme.test"),
        (keys::EMAIL_SMTP_PORT, "587"),
        (keys::EMAIL_SMTP_USER, "alerts"),
        (keys::EMAIL_SMTP_PASSWORD, "secret"),
        (keys::EMAIL_FROM, "alerts@acme.test"),
        (keys::EMAIL_TO, "pm@acme.test, ceo@acme.test"),
    ]
}

struct Fixture {
    repos: Arc<InMemoryRepos>,
    webhook: Arc<RecordingWebhook>,
    email: Arc<RecordingEmail>,
    dispatcher: NotificationDispatcher,
}

impl Fixture {
    fn new(webhook: Arc<RecordingWebhook>, email: Arc<RecordingEmail>) -> Self {
        let repos = InMemoryRepos::new();
        let dispatcher = NotificationDispatcher::new(repos.clone(), webhook.clone(), email.clone());
        Self {
            repos,
            webhook,
            email,
            dispatcher,
        }
    }

    fn healthy() -> Self {
        Self::new(RecordingWebhook::new(), RecordingEmail::new())
    }
}

#[tokio::test]
async fn test_min_severity_filters_lower_changes() {
    let fx = Fixture::healthy();
    fx.repos.set_settings(&webhook_settings());
    fx.repos.set_settings(&[(keys::NOTIFY_MIN_SEVERITY, "medium")]);

    let low = fx.dispatcher.dispatch(&change(Severity::Low), &target()).await;
    assert_eq!(low, DispatchReport::BelowThreshold);
    assert_eq!(fx.webhook.count(), 0);

    let medium = fx
        .dispatcher
        .dispatch(&change(Severity::Medium), &target())
        .await;
    assert_eq!(
        medium,
        DispatchReport::Attempted {
            webhook: ChannelOutcome::Sent,
            email: ChannelOutcome::NotConfigured,
        }
    );
    assert_eq!(fx.webhook.count(), 1);
}

#[tokio::test]
async fn test_missing_threshold_defaults_to_high() {
    let fx = Fixture::healthy();
    fx.repos.set_settings(&webhook_settings());

    let report = fx
        .dispatcher
        .dispatch(&change(Severity::Medium), &target())
        .await;
    assert_eq!(report, DispatchReport::BelowThreshold);

    fx.repos.set_settings(&[(keys::NOTIFY_MIN_SEVERITY, "critical")]);
    let report = fx
        .dispatcher
        .dispatch(&change(Severity::Medium), &target())
        .await;
    assert_eq!(report, DispatchReport::BelowThreshold);

    fx.dispatcher.dispatch(&change(Severity::High), &target()).await;
    assert_eq!(fx.webhook.count(), 1);
}

#[tokio::test]
async fn test_webhook_payload_shape() {
    let fx = Fixture::healthy();
    fx.repos.set_settings(&webhook_settings());

    fx.dispatcher.dispatch(&change(Severity::High), &target()).await;

    let posts = fx.webhook.posts.lock().unwrap();
    let (url, payload) = &posts[0];
    assert_eq!(url, WEBHOOK_URL);
    assert_eq!(
        payload["text"],
        "🔴 *[Acme]* — High severity change detected"
    );
    let attachment = &payload["attachments"][0];
    assert_eq!(attachment["title"], "Page changed: https://acme.test/pricing");
    assert_eq!(attachment["title_link"], "https://acme.test/pricing");
    assert_eq!(attachment["fields"][0]["title"], "Competitor");
    assert_eq!(attachment["fields"][0]["value"], "Acme");
    assert_eq!(attachment["fields"][1]["short"], true);
    assert_eq!(attachment["footer"], "CompetitorWatch");
    assert!(attachment["ts"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_disabled_webhook_is_not_configured() {
    let fx = Fixture::healthy();
    fx.repos
        .set_settings(&[(keys::WEBHOOK_ENABLED, "false"), (keys::WEBHOOK_URL, WEBHOOK_URL)]);

    let report = fx.dispatcher.dispatch(&change(Severity::High), &target()).await;
    assert_eq!(
        report,
        DispatchReport::Attempted {
            webhook: ChannelOutcome::NotConfigured,
            email: ChannelOutcome::NotConfigured,
        }
    );
    assert_eq!(fx.webhook.count(), 0);
}

/// 一个渠道失败不影响另一个渠道
#[tokio::test]
async fn test_webhook_failure_does_not_block_email() {
    let fx = Fixture::new(RecordingWebhook::failing(500), RecordingEmail::new());
    fx.repos.set_settings(&webhook_settings());
    fx.repos.set_settings(&email_settings());

    let report = fx.dispatcher.dispatch(&change(Severity::High), &target()).await;

    match report {
        DispatchReport::Attempted { webhook, email } => {
            assert!(matches!(webhook, ChannelOutcome::Failed(_)));
            assert_eq!(email, ChannelOutcome::Sent);
        }
        other => panic!("unexpected report: {:?}", other),
    }

    let sent = fx.email.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.to, vec!["pm@acme.test", "ceo@acme.test"]);
    assert!(sent[0].1.subject.contains("[Acme]"));
}

#[tokio::test]
async fn test_email_failure_does_not_block_webhook() {
    let fx = Fixture::new(RecordingWebhook::new(), RecordingEmail::failing());
    fx.repos.set_settings(&webhook_settings());
    fx.repos.set_settings(&email_settings());

    let report = fx.dispatcher.dispatch(&change(Severity::High), &target()).await;

    match report {
        DispatchReport::Attempted { webhook, email } => {
            assert_eq!(webhook, ChannelOutcome::Sent);
            assert!(matches!(email, ChannelOutcome::Failed(_)));
        }
        other => panic!("unexpected report: {:?}", other),
    }
}

#[tokio::test]
async fn test_incomplete_smtp_settings_skip_email() {
    let fx = Fixture::healthy();
    fx.repos.set_settings(&email_settings());
    fx.repos.set_settings(&[(keys::EMAIL_SMTP_PORT, "not-a-port")]);

    fx.dispatcher.dispatch(&change(Severity::High), &target()).await;
    assert_eq!(fx.email.count(), 0);
}

#[tokio::test]
async fn test_settings_failure_abandons_dispatch() {
    let fx = Fixture::healthy();
    fx.repos.set_settings(&webhook_settings());
    fx.repos.fail_settings_reads.store(true, Ordering::SeqCst);

    let report = fx.dispatcher.dispatch(&change(Severity::High), &target()).await;

    assert_eq!(report, DispatchReport::SettingsUnavailable);
    assert_eq!(fx.webhook.count(), 0);
}

#[tokio::test]
async fn test_send_test_webhook_ignores_enabled_flag() {
    let fx = Fixture::healthy();
    fx.repos
        .set_settings(&[(keys::WEBHOOK_ENABLED, "false"), (keys::WEBHOOK_URL, WEBHOOK_URL)]);

    fx.dispatcher.send_test_webhook().await.unwrap();

    let posts = fx.webhook.posts.lock().unwrap();
    assert_eq!(posts.len(), 1);
    let attachment = &posts[0].1["attachments"][0];
    assert_eq!(attachment["fields"][0]["title"], "Status");
    assert_eq!(attachment["fields"][1]["title"], "Source");
}

#[tokio::test]
async fn test_send_test_webhook_requires_url() {
    let fx = Fixture::healthy();

    let result = fx.dispatcher.send_test_webhook().await;
    assert!(matches!(result, Err(NotificationError::NotConfigured(_))));
}

#[tokio::test]
async fn test_send_test_webhook_surfaces_status() {
    let fx = Fixture::new(RecordingWebhook::failing(404), RecordingEmail::new());
    fx.repos.set_settings(&[(keys::WEBHOOK_URL, WEBHOOK_URL)]);

    let result = fx.dispatcher.send_test_webhook().await;
    assert!(matches!(
        result,
        Err(NotificationError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_send_test_email_names_missing_fields() {
    let fx = Fixture::healthy();
    fx.repos.set_settings(&[
        (keys::EMAIL_SMTP_HOST, "smtp.acme.test"),
        (keys::EMAIL_SMTP_PORT, "465"),
    ]);

    let result = fx.dispatcher.send_test_email().await;
    match result {
        Err(NotificationError::NotConfigured(message)) => {
            assert!(message.contains(keys::EMAIL_SMTP_USER));
            assert!(message.contains(keys::EMAIL_TO));
            assert!(!message.contains(keys::EMAIL_SMTP_HOST));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(fx.email.count(), 0);
}

#[tokio::test]
async fn test_send_test_email_names_blank_recipients() {
    let fx = Fixture::healthy();
    fx.repos.set_settings(&email_settings());
    fx.repos.set_settings(&[(keys::EMAIL_TO, " , ")]);

    let result = fx.dispatcher.send_test_email().await;
    match result {
        Err(NotificationError::NotConfigured(message)) => {
            assert!(message.ends_with(&format!("missing or invalid: {}", keys::EMAIL_TO)));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(fx.email.count(), 0);
}

#[tokio::test]
async fn test_send_test_email() {
    let fx = Fixture::healthy();
    fx.repos.set_settings(&email_settings());
    fx.repos.set_settings(&[(keys::EMAIL_ENABLED, "false")]);

    fx.dispatcher.send_test_email().await.unwrap();

    let sent = fx.email.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.subject, "🟢 CompetitorWatch — Test Email");
    assert_eq!(sent[0].0.port, 587);
}
