//! Redmine REST API tracker implementation.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::config::TrackerConfig;
use super::error::TrackerError;
use super::traits::Tracker;
use super::types::{sign_message, Ticket, TicketAuthor, TicketQuery, TicketStatus};

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

#[derive(Debug, Deserialize)]
struct IssuesResponse {
    issues: Vec<RedmineIssue>,
    #[serde(default)]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct RedmineIssue {
    id: u64,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    description: Option<String>,
    status: NamedRef,
    author: NamedRef,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    user: NamedRef,
}

#[derive(Debug, Serialize)]
struct IssueUpdateRequest<'a> {
    issue: IssueUpdate<'a>,
}

#[derive(Debug, Serialize)]
struct IssueUpdate<'a> {
    status_id: u64,
    assigned_to_id: u64,
    notes: &'a str,
}

impl From<RedmineIssue> for Ticket {
    fn from(issue: RedmineIssue) -> Self {
        Ticket {
            id: issue.id,
            subject: issue.subject,
            status: issue.status.name,
            description: issue.description.unwrap_or_default(),
            author: TicketAuthor {
                id: issue.author.id,
                name: issue.author.name,
            },
        }
    }
}

/// Tracker backed by a Redmine server.
pub struct RedmineTracker {
    client: Client,
    config: TrackerConfig,
    bot_user_id: OnceCell<u64>,
}

impl RedmineTracker {
    /// Create a new Redmine tracker with the given configuration.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrackerError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config,
            bot_user_id: OnceCell::new(),
        })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn issues_url(&self) -> String {
        format!("{}/issues.json", self.base_url())
    }

    fn issue_url(&self, id: u64) -> String {
        format!("{}/issues/{}.json", self.base_url(), id)
    }

    fn status_id(&self, status: TicketStatus) -> u64 {
        let statuses = &self.config.statuses;
        match status {
            TicketStatus::New => statuses.new,
            TicketStatus::InProgress => statuses.in_progress,
            TicketStatus::AwaitingJobResult => statuses.awaiting_result,
            TicketStatus::Feedback => statuses.feedback,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TrackerError> {
        let response = request
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TrackerError::Timeout
                } else if e.is_connect() {
                    TrackerError::ConnectionFailed(e.to_string())
                } else {
                    TrackerError::InvalidResponse(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::ApiError {
                status,
                message: body.chars().take(200).collect(),
            });
        }

        Ok(response)
    }

    /// The user tickets are assigned to while in progress.
    async fn bot_user_id(&self) -> Result<u64, TrackerError> {
        if let Some(id) = self.config.bot_user_id {
            return Ok(id);
        }

        self.bot_user_id
            .get_or_try_init(|| async {
                let url = format!("{}/users/current.json", self.base_url());
                let response = self.send(self.client.get(&url)).await?;
                let current: CurrentUserResponse = response
                    .json()
                    .await
                    .map_err(|e| TrackerError::InvalidResponse(e.to_string()))?;
                info!(
                    "Resolved bot user {} ({})",
                    current.user.id, current.user.name
                );
                Ok(current.user.id)
            })
            .await
            .copied()
    }

    async fn update_issue(
        &self,
        ticket: &Ticket,
        status: TicketStatus,
        assignee: u64,
        message: &str,
    ) -> Result<(), TrackerError> {
        let notes = sign_message(message, &self.config.bot_signature);
        let body = IssueUpdateRequest {
            issue: IssueUpdate {
                status_id: self.status_id(status),
                assigned_to_id: assignee,
                notes: &notes,
            },
        };

        debug!(ticket_id = ticket.id, %status, assignee, "Updating issue");

        let result = self
            .send(self.client.put(self.issue_url(ticket.id)).json(&body))
            .await;

        match result {
            Err(TrackerError::ApiError { status: 404, .. }) => {
                Err(TrackerError::TicketNotFound(ticket.id))
            }
            other => other.map(|_| ()),
        }
    }
}

#[async_trait]
impl Tracker for RedmineTracker {
    fn name(&self) -> &str {
        "redmine"
    }

    async fn find_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, TrackerError> {
        let status_id = self.status_id(query.status).to_string();
        let limit = self.config.page_limit.max(1).to_string();
        let mut offset: u64 = 0;
        let mut tickets = Vec::new();

        loop {
            let offset_param = offset.to_string();
            let request = self.client.get(self.issues_url()).query(&[
                ("status_id", status_id.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset_param.as_str()),
            ]);

            let page: IssuesResponse = self
                .send(request)
                .await?
                .json()
                .await
                .map_err(|e| TrackerError::InvalidResponse(e.to_string()))?;

            let fetched = page.issues.len() as u64;
            tickets.extend(
                page.issues
                    .into_iter()
                    .filter(|issue| query.matches_subject(&issue.subject))
                    .map(Ticket::from),
            );

            offset += fetched;
            if fetched == 0 || offset >= page.total_count {
                break;
            }
        }

        debug!(
            "Found {} tickets with subject '{}' and status {}",
            tickets.len(),
            query.subject,
            query.status
        );

        Ok(tickets)
    }

    async fn assign_to_bot(&self, ticket: &Ticket, message: &str) -> Result<(), TrackerError> {
        let bot = self.bot_user_id().await?;
        self.update_issue(ticket, TicketStatus::InProgress, bot, message)
            .await
    }

    async fn assign_to_author(
        &self,
        ticket: &Ticket,
        status: TicketStatus,
        message: &str,
    ) -> Result<(), TrackerError> {
        self.update_issue(ticket, status, ticket.author.id, message)
            .await
    }
}
