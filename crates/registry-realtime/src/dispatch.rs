//! Maps inbound actions to service calls and outbound notifications.

use std::sync::Arc;

use tracing::{error, info, warn};

use registry_core::error::AppError;
use registry_core::types::UserId;
use registry_service::{GiftService, VisitorService};

use crate::connection::handle::ConnectionHandle;
use crate::connection::manager::ConnectionManager;
use crate::message::types::{
    GiftCreatedData, InboundAction, OpenedState, OutboundAction, PeerGiftData,
};
use crate::message::validator::parse_gift_request;
use crate::metrics::RealtimeMetrics;
use crate::notification::Notification;

/// Runs one inbound action to completion and says who to tell.
#[derive(Debug)]
pub struct ActionDispatcher {
    connections: Arc<ConnectionManager>,
    visitors: Arc<VisitorService>,
    gifts: Arc<GiftService>,
    metrics: Arc<RealtimeMetrics>,
}

impl ActionDispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        connections: Arc<ConnectionManager>,
        visitors: Arc<VisitorService>,
        gifts: Arc<GiftService>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            connections,
            visitors,
            gifts,
            metrics,
        }
    }

    /// Handle an action from `handle`.
    pub async fn dispatch(
        &self,
        handle: &ConnectionHandle,
        action: InboundAction,
    ) -> Vec<Notification> {
        match action {
            InboundAction::ConnectionOpen => self.connection_open(handle).await,
            InboundAction::GiftCreate { data } => self.gift_create(handle, data).await,
        }
    }

    /// Notification for a socket that went away, if it was an opened visitor.
    pub fn disconnected(&self, user_id: Option<UserId>) -> Option<Notification> {
        user_id.map(|user_id| Notification::everyone(OutboundAction::ConnectionClosed { user_id }))
    }

    async fn connection_open(&self, handle: &ConnectionHandle) -> Vec<Notification> {
        let reply = |message: String| {
            vec![Notification::reply(
                handle.id,
                OutboundAction::ConnectionOpenError { message },
            )]
        };

        if handle.is_opened() {
            return reply(AppError::conflict("Connection already opened").message);
        }

        let opened = match self.visitors.open(handle.metadata.clone()).await {
            Ok(opened) => opened,
            Err(e) => {
                log_failure(&e, "CONNECTION_OPEN", handle);
                return reply(e.message);
            }
        };

        if let Err(e) = self.connections.open(&handle.id, opened.user.id) {
            log_failure(&e, "CONNECTION_OPEN", handle);
            return reply(e.message);
        }

        vec![Notification::reply(
            handle.id,
            OutboundAction::ConnectionOpened {
                state: OpenedState {
                    user: opened.user,
                    registry: opened.registry,
                    client_token: opened.client_token,
                },
            },
        )]
    }

    async fn gift_create(
        &self,
        handle: &ConnectionHandle,
        data: Option<serde_json::Value>,
    ) -> Vec<Notification> {
        let reply = |message: String| {
            vec![Notification::reply(
                handle.id,
                OutboundAction::GiftCreateError { message },
            )]
        };

        let request = match parse_gift_request(data.as_ref()) {
            Ok(request) => request,
            Err(e) => {
                self.metrics.gift_failed();
                info!(conn_id = %handle.id, reason = %e.message, "GIFT_CREATE rejected");
                return reply(e.message);
            }
        };

        let Some(user_id) = handle.user_id() else {
            self.metrics.gift_failed();
            return reply("Connection not opened".to_string());
        };

        match self.gifts.create(user_id, request).await {
            Ok(receipt) => {
                self.metrics.gift_created();
                vec![
                    Notification::reply(
                        handle.id,
                        OutboundAction::GiftCreated {
                            data: GiftCreatedData {
                                registry: receipt.registry.clone(),
                                user: receipt.user,
                            },
                        },
                    ),
                    Notification::peers(
                        handle.id,
                        OutboundAction::PeerGiftCreated {
                            data: PeerGiftData {
                                registry: receipt.registry,
                                gift: receipt.comment,
                            },
                        },
                    ),
                ]
            }
            Err(e) => {
                self.metrics.gift_failed();
                log_failure(&e, "GIFT_CREATE", handle);
                reply(e.message)
            }
        }
    }
}

fn log_failure(e: &AppError, action: &str, handle: &ConnectionHandle) {
    if e.is_server_side() {
        error!(
            conn_id = %handle.id,
            action,
            error = %e,
            source = ?e.source,
            "Action failed"
        );
    } else {
        warn!(conn_id = %handle.id, action, error = %e, "Action failed");
    }
}
