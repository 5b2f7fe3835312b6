//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::UsersService;
use crate::domain::ports::{UserRepository, UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users_query: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use user_api::domain::UsersService;
    /// use user_api::inbound::http::state::HttpState;
    /// use user_api::outbound::memory::InMemoryUserRepository;
    ///
    /// let service = Arc::new(UsersService::new(Arc::new(InMemoryUserRepository::default())));
    /// let _state = HttpState::new(service.clone(), service);
    /// ```
    pub fn new(users_query: Arc<dyn UsersQuery>, users_command: Arc<dyn UsersCommand>) -> Self {
        Self {
            users_query,
            users_command,
        }
    }

    /// Wire both ports to a [`UsersService`] over `repository`.
    pub fn from_repository(repository: Arc<dyn UserRepository>) -> Self {
        let service = Arc::new(UsersService::new(repository));
        Self::new(service.clone(), service)
    }
}
