// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::chain::Connector;
use crate::config::ChainConfig;
use crate::relay::{Fetcher, RelayDispatcher};
use crate::resolver::Resolver;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub relay: RelayDispatcher,
}

impl AppState {
    pub fn new(config: ChainConfig, connector: Arc<dyn Connector>, fetcher: Arc<dyn Fetcher>) -> Self {
        let sessions = Arc::new(SessionManager::new(config, connector));
        Self {
            resolver: Resolver::new(sessions),
            relay: RelayDispatcher::new(fetcher),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        self.resolver.sessions()
    }
}
